pub mod clock;
pub mod notion;

pub use clock::SystemClock;
pub use notion::NotionAdapter;
