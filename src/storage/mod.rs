pub mod history;
pub mod log;

pub use history::HistoryBuffer;
pub use log::PersistenceLog;
