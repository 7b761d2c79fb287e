//! Capabilities granted to demo session roles.
//!
//! These bits gate commands in the console front end. They are a stand-in
//! for real authorization: any caller may log in as either role.

use bitflags::bitflags;

bitflags! {
    /// Operations a session may perform.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Privileges: u8 {
        /// Run badge verifications and view the quick log.
        const VERIFY_ACCESS = 1 << 0;
        /// Create, edit and remove users.
        const MANAGE_USERS = 1 << 1;
        /// List, filter and export access records.
        const VIEW_ACCESSES = 1 << 2;
        /// View and export reports.
        const VIEW_REPORTS = 1 << 3;
        /// View and change settings.
        const EDIT_SETTINGS = 1 << 4;
    }
}

impl Privileges {
    /// Privileges of the operator console.
    #[must_use]
    pub const fn operator() -> Self { Self::VERIFY_ACCESS }

    /// Privileges of the admin dashboard.
    #[must_use]
    pub const fn admin() -> Self {
        Self::from_bits_truncate(
            Self::MANAGE_USERS.bits()
                | Self::VIEW_ACCESSES.bits()
                | Self::VIEW_REPORTS.bits()
                | Self::EDIT_SETTINGS.bits(),
        )
    }
}
