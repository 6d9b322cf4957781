pub mod answer;
pub mod message;
pub mod session;
pub mod table;

pub use answer::CannedAnswer;
pub use message::{Message, Role};
pub use session::{generate_title, NewSession, Session, SessionSummary, DEFAULT_TITLE};
pub use table::{Row, Table, EMPTY_CELL};
