mod sanitizer;


pub use sanitizer::{IdError, IdSanitizer};
