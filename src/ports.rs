pub mod time;

pub use self::time::TimeProvider;
