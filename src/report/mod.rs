mod calls;
mod display;

pub use calls::{Payload, ReadClass, ReadDetail, ReadTag, TredCalls};
pub use display::{render, CallDisplay, DisplayModel, ReadSupport, Severity};
