use super::*;
use crate::ast::build::*;
use crate::ast::{BinOp, ExternType, InstanceId};
use crate::diagnostic::Severity;

fn guarded(flag: &str, field: &str) -> Spanned<Stmt> {
    if_then(var(flag), assign(var(field), int(1)))
}

#[test]
fn test_blocks_share_one_counter() {
    let blocks = vec![
        ControlBlock::new("ingress", guarded("a", "x")),
        ControlBlock::new("egress", guarded("b", "y")),
    ];
    let unit = lower_unit(&blocks, &ChecksumTable::new(), &LowerConfig::default()).unwrap();
    assert_eq!(unit.blocks.len(), 2);
    assert!(unit.warnings.is_empty());
    let egress = unit.block("egress").unwrap();
    assert!(egress.render().contains("label_1true:"));
    assert!(!egress.render().contains("label_0"));
}

#[test]
fn test_recoverable_errors_collected_across_blocks() {
    let bad_emit = |what: u64| {
        call_stmt(extern_call(
            "Deparser",
            "packet",
            ExternType::PacketOut,
            "emit",
            vec![int(what)],
        ))
    };
    let blocks = vec![
        ControlBlock::new("ingress", block(vec![bad_emit(1), assign(var("x"), int(1))])),
        ControlBlock::new("egress", bad_emit(2)),
    ];
    let errors = lower_unit(&blocks, &ChecksumTable::new(), &LowerConfig::default()).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn test_fatal_stops_unit() {
    let blocks = vec![
        ControlBlock::new(
            "ingress",
            assign(var("x"), binary(BinOp::Mul, var("a"), var("b"))),
        ),
        // never reached
        ControlBlock::new(
            "egress",
            assign(var("y"), binary(BinOp::BXor, var("a"), var("b"))),
        ),
    ];
    let errors = lower_unit(&blocks, &ChecksumTable::new(), &LowerConfig::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_fatal());
    assert!(errors[0].message.contains("'*'"));
}

#[test]
fn test_warnings_returned_with_unit() {
    let read = call_stmt(extern_call(
        "Ingress",
        "counts",
        ExternType::Register,
        "read",
        vec![var("v"), int(0)],
    ));
    let blocks = vec![ControlBlock::new("ingress", read)];
    let unit = lower_unit(&blocks, &ChecksumTable::new(), &LowerConfig::default()).unwrap();
    assert_eq!(unit.warnings.len(), 1);
    assert_eq!(unit.warnings[0].severity, Severity::Warning);
    assert!(unit.blocks[0].instrs.is_empty());
}

#[test]
fn test_parallel_blocks_use_disjoint_prefixes() {
    let blocks = vec![
        ControlBlock::new("ingress", guarded("a", "x")),
        ControlBlock::new("egress", guarded("b", "y")),
        ControlBlock::new("deparser", guarded("c", "z")),
    ];
    let unit =
        lower_unit_parallel(&blocks, &ChecksumTable::new(), &LowerConfig::default()).unwrap();
    let names: Vec<_> = unit.blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["ingress", "egress", "deparser"]);
    assert!(unit.blocks[0].render().contains("label_0_0true:"));
    assert!(unit.blocks[1].render().contains("label_1_0true:"));
    assert!(unit.blocks[2].render().contains("label_2_0end:"));
}

#[test]
fn test_parallel_collects_fatal_and_recoverable() {
    let mut checksums = ChecksumTable::new();
    checksums.insert(InstanceId::new("Ingress", "ck"), "csum_0");
    let blocks = vec![
        ControlBlock::new(
            "ingress",
            call_stmt(extern_call(
                "Ingress",
                "ck",
                ExternType::InternetChecksum,
                "add",
                vec![var("not_a_list")],
            )),
        ),
        ControlBlock::new("egress", call_stmt(extern_fn("log_msg", vec![]))),
    ];
    let errors = lower_unit_parallel(&blocks, &checksums, &LowerConfig::default()).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].severity, Severity::Error);
    assert!(errors[1].is_fatal());
}

#[test]
fn test_verifier_can_be_disabled() {
    let config = LowerConfig {
        verify_output: false,
        ..LowerConfig::default()
    };
    let blocks = vec![ControlBlock::new("ingress", guarded("a", "x"))];
    assert!(lower_unit(&blocks, &ChecksumTable::new(), &config).is_ok());
}

#[test]
fn test_verify_blocks_flags_reused_labels() {
    let mut ingress = lower_unit(
        &[ControlBlock::new("ingress", guarded("a", "x"))],
        &ChecksumTable::new(),
        &LowerConfig::default(),
    )
    .unwrap()
    .blocks;
    let mut egress = ingress[0].clone();
    egress.name = "egress".to_string();
    ingress.push(egress);
    let diagnostics = verify_blocks(&ingress);
    // true, false and end labels all reused
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics.iter().all(Diagnostic::is_fatal));
}
