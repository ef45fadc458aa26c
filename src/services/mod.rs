pub mod record;
pub mod transfer;

pub use record::RecordService;
pub use transfer::TransferService;
