mod id64;

pub use id64::*;
