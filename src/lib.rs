//! Lowering of type-checked P4 control-block statements into DPDK
//! pseudo-assembly instructions.

pub mod api;
pub mod ast;
pub mod checksum;
pub mod config;
pub mod diagnostic;
pub mod ir;
pub mod lower;
pub mod span;
pub mod verify;

pub use api::*;
pub use checksum::ChecksumTable;
pub use config::LowerConfig;
pub use diagnostic::{render_diagnostics, Diagnostic, Severity};
pub use ir::{render, Instr, Label, LabelGen};
pub use lower::StmtLowering;
