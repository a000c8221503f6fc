pub mod error;
pub mod export;
pub mod login;
pub mod roster;

pub use error::{ExportError, LoginError};
pub use export::{EXPORT_HEADERS, documents_dir, export_file_name, export_records, write_records};
pub use login::manual_login;
pub use roster::{ROSTER_FILE_NAME, Roster, default_roster_path};
