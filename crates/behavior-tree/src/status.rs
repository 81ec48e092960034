//! Status returned by node dispatch.

/// The result of ticking a node.
///
/// The four values are disjoint. Composite strategies do not compare results
/// by equality; they ask whether a result belongs to the success, failure or
/// running set (see [`Status::in_success_set`]). `Error` belongs to every
/// set, so an erroring child short-circuits any composite that is looking for
/// a terminal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// A leaf action failed to run or produced a result that is not a status.
    ///
    /// Also produced by strategies that need a child but have none.
    Error,

    /// The node completed successfully.
    Success,

    /// The node completed without success.
    Failure,

    /// The node has not finished; tick it again on the next control cycle.
    Running,
}

impl Status {
    /// Integer code reported by a tree handle that has not produced a result.
    pub const UNSET_CODE: i32 = 0;

    const ERROR_BITS: u8 = 0b111;
    const SUCCESS_BITS: u8 = 0b001;
    const FAILURE_BITS: u8 = 0b010;
    const RUNNING_BITS: u8 = 0b100;

    /// Integer code used at the embedding boundary.
    #[inline]
    pub const fn code(self) -> i32 {
        match self {
            Status::Error => -1,
            Status::Success => 1,
            Status::Failure => 2,
            Status::Running => 4,
        }
    }

    /// Coerces an integer returned by a leaf action.
    ///
    /// Returns `None` for integers that are not one of the four codes.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Status::Error),
            1 => Some(Status::Success),
            2 => Some(Status::Failure),
            4 => Some(Status::Running),
            _ => None,
        }
    }

    #[inline]
    const fn bits(self) -> u8 {
        match self {
            Status::Error => Self::ERROR_BITS,
            Status::Success => Self::SUCCESS_BITS,
            Status::Failure => Self::FAILURE_BITS,
            Status::Running => Self::RUNNING_BITS,
        }
    }

    /// Returns `true` if this status is exactly `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is exactly `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` if this status is exactly `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// Membership in the success set (`Success` or `Error`).
    #[inline]
    pub fn in_success_set(self) -> bool {
        self.bits() & Self::SUCCESS_BITS != 0
    }

    /// Membership in the failure set (`Failure` or `Error`).
    #[inline]
    pub fn in_failure_set(self) -> bool {
        self.bits() & Self::FAILURE_BITS != 0
    }

    /// Membership in the running set (`Running` or `Error`).
    #[inline]
    pub fn in_running_set(self) -> bool {
        self.bits() & Self::RUNNING_BITS != 0
    }

    /// Flips `Success` and `Failure`; `Running` and `Error` are returned unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            other => other,
        }
    }
}
