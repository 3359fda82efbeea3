//! Logical frame phases a continuation can be posted to.

/// Phase of a frame-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FrameTiming {
    /// No phase requested; resume inline.
    #[default]
    NotSpecified = 0,
    /// Before the regular update.
    EarlyUpdate = 1,
    /// Regular per-frame update.
    Update = 2,
    /// After every update.
    LateUpdate = 3,
    /// Just before the frame is rendered.
    BeforeRendering = 4,
    /// After the frame is rendered.
    AfterRendering = 5,
}

impl FrameTiming {
    /// Every timing, in frame order.
    pub const ALL: [FrameTiming; 6] = [
        FrameTiming::NotSpecified,
        FrameTiming::EarlyUpdate,
        FrameTiming::Update,
        FrameTiming::LateUpdate,
        FrameTiming::BeforeRendering,
        FrameTiming::AfterRendering,
    ];

    /// True unless this is [`FrameTiming::NotSpecified`].
    #[inline]
    pub fn is_specified(self) -> bool {
        self != FrameTiming::NotSpecified
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            FrameTiming::NotSpecified => "not_specified",
            FrameTiming::EarlyUpdate => "early_update",
            FrameTiming::Update => "update",
            FrameTiming::LateUpdate => "late_update",
            FrameTiming::BeforeRendering => "before_rendering",
            FrameTiming::AfterRendering => "after_rendering",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}
