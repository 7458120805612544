pub mod catalog;
pub mod date;
pub mod domain;
pub mod fields;
pub mod flow;
pub mod parser;
pub mod ports;
pub mod protocol;
pub mod session;

#[cfg(test)]
mod proptests;

pub use catalog::OptionCatalog;
pub use domain::{
    Currency, DatabaseSchema, ExpenseRecord, ParsedEntry, PropertyKind, ResolvedDate,
    SelectOption, Session, Step, UserId,
};
pub use flow::{FlowError, FlowResult, SelectionFlow};
pub use ports::{Clock, PortError, PortResult, RecordSink, SchemaSource};
pub use protocol::{Choice, FlowReply, Selection, UnknownCallback, MAX_CALLBACK_BYTES};
