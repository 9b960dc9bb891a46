pub mod scanner;

pub use scanner::scan_for_advertisements;
