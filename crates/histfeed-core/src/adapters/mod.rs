mod lseg;
mod yahoo;

pub use lseg::LsegAdapter;
pub use yahoo::YahooAdapter;
