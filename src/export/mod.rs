pub mod conversion;
pub mod definition;
pub mod directory;
pub mod naming;

pub use conversion::*;
pub use definition::*;
pub use directory::*;
pub use naming::clean_display_name;
