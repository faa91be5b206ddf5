pub mod catalog;
pub mod format;
pub mod invoice;
pub mod logging;
