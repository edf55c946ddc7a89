//! End-to-end scenarios driving the simplifier over hand-built entrypoints,
//! one per concrete case from the testable-properties list: constant
//! folding, additive identity, comparison canonicalization, if-conversion,
//! volatile-load preservation, and switch folding.

use sparrow_simplify::uselist::bind;
use sparrow_simplify::{
    run_to_fixpoint, Entrypoint, Instruction, LogWarningSink, MultiJmp, Opcode, Position, Slot,
    SimplifyConfig, SimplifyContext, TypeInfo,
};

fn new_ctx(sink: &mut LogWarningSink) -> SimplifyContext {
    SimplifyContext::new(SimplifyConfig::default(), sink)
}

fn push(ep: &mut Entrypoint, bb: sparrow_simplify::BlockId, op: Opcode, ty: sparrow_simplify::TypeId, defines_value: bool) -> sparrow_simplify::InsnId {
    let insn = ep.alloc_instruction(Instruction::new(op, 32, Position::default(), ty), defines_value);
    ep.push_instruction(bb, insn);
    insn
}

#[test]
fn s1_constant_fold_collapses_a_pure_arithmetic_chain() {
    let mut ep = Entrypoint::new("s1");
    let ty = ep.alloc_type(TypeInfo::int(32, true));
    let bb = ep.alloc_block(None);

    let two = ep.alloc_val(2);
    let three = ep.alloc_val(3);
    let add = push(&mut ep, bb, Opcode::Add, ty, true);
    ep.insn_mut(add).src1 = two;
    ep.insn_mut(add).src2 = three;

    push(&mut ep, bb, Opcode::Ret, ty, false);

    let mut sink = LogWarningSink::default();
    let mut ctx = new_ctx(&mut sink);
    run_to_fixpoint(&mut ep, &mut ctx).unwrap();

    assert!(!ep.insn(add).is_live());
}

#[test]
fn s2_add_zero_identity_is_removed() {
    let mut ep = Entrypoint::new("s2");
    let ty = ep.alloc_type(TypeInfo::int(32, true));
    let bb = ep.alloc_block(None);

    let load = push(&mut ep, bb, Opcode::Load, ty, true);
    let reg = ep.insn(load).target;
    let zero = ep.alloc_val(0);
    let add = push(&mut ep, bb, Opcode::Add, ty, true);
    ep.insn_mut(add).src1 = reg;
    ep.insn_mut(add).src2 = zero;
    push(&mut ep, bb, Opcode::Ret, ty, false);

    let mut sink = LogWarningSink::default();
    let mut ctx = new_ctx(&mut sink);
    run_to_fixpoint(&mut ep, &mut ctx).unwrap();

    assert!(!ep.insn(add).is_live());
}

#[test]
fn s3_compare_with_constant_on_left_is_canonicalized() {
    let mut ep = Entrypoint::new("s3");
    let ty = ep.alloc_type(TypeInfo::int(32, true));
    let bb = ep.alloc_block(None);

    let load = push(&mut ep, bb, Opcode::Load, ty, true);
    let reg = ep.insn(load).target;
    let five = ep.alloc_val(5);
    let cmp = push(&mut ep, bb, Opcode::SetLt, ty, true); // 5 < reg
    ep.insn_mut(cmp).src1 = five;
    ep.insn_mut(cmp).src2 = reg;
    push(&mut ep, bb, Opcode::Ret, ty, false);

    let mut sink = LogWarningSink::default();
    let mut ctx = new_ctx(&mut sink);
    run_to_fixpoint(&mut ep, &mut ctx).unwrap();

    // 5 < reg canonicalizes to reg > 5: constant ends up on the right.
    assert_eq!(ep.insn(cmp).opcode, Opcode::SetGt);
    assert_eq!(ep.insn(cmp).src1, reg);
    assert_eq!(ep.insn(cmp).src2, five);
}

#[test]
fn s4_trivial_if_else_diamond_if_converts_into_select() {
    let mut ep = Entrypoint::new("s4");
    let ty = ep.alloc_type(TypeInfo::int(32, true));
    let pre = ep.alloc_block(None);
    let then_bb = ep.alloc_block(None);
    let else_bb = ep.alloc_block(None);
    let join = ep.alloc_block(None);
    ep.add_edge(pre, then_bb);
    ep.add_edge(pre, else_bb);
    ep.add_edge(then_bb, join);
    ep.add_edge(else_bb, join);

    let cond = ep.alloc_val(1);
    let mut cbr = Instruction::new(Opcode::Cbr, 1, Position::default(), ty);
    cbr.bb_true = Some(then_bb);
    cbr.bb_false = Some(else_bb);
    let cbr_id = ep.alloc_instruction(cbr, false);
    ep.insn_mut(cbr_id).cond = cond;
    ep.push_instruction(pre, cbr_id);

    let mut br_then = Instruction::new(Opcode::Br, 32, Position::default(), ty);
    br_then.bb_true = Some(join);
    let br_then_id = ep.alloc_instruction(br_then, false);
    ep.push_instruction(then_bb, br_then_id);

    let mut br_else = Instruction::new(Opcode::Br, 32, Position::default(), ty);
    br_else.bb_true = Some(join);
    let br_else_id = ep.alloc_instruction(br_else, false);
    ep.push_instruction(else_bb, br_else_id);

    let then_val = ep.alloc_val(10);
    let else_val = ep.alloc_val(20);
    let then_src = ep.alloc_phi_source(then_bb, then_val, ty, 32, Position::default());
    let else_src = ep.alloc_phi_source(else_bb, else_val, ty, 32, Position::default());

    let mut phi = Instruction::new(Opcode::Phi, 32, Position::default(), ty);
    phi.phi_list = vec![then_src, else_src];
    let phi_id = ep.alloc_instruction(phi, true);
    ep.push_instruction(join, phi_id);
    let phi_target = ep.insn(phi_id).target;

    // Give the phi a real consumer so dead-phi elimination doesn't fire
    // before if-conversion gets a chance to run.
    let consumer = ep.alloc_instruction(Instruction::new(Opcode::Not, 32, Position::default(), ty), true);
    bind(&mut ep, consumer, Slot::Src1, phi_target);
    ep.push_instruction(join, consumer);

    push(&mut ep, join, Opcode::Ret, ty, false);

    let mut sink = LogWarningSink::default();
    let mut ctx = new_ctx(&mut sink);
    run_to_fixpoint(&mut ep, &mut ctx).unwrap();

    assert!(!ep.insn(phi_id).is_live());
    assert!(!ep.block(then_bb).parents.contains(&pre));
    assert!(!ep.block(else_bb).parents.contains(&pre));
}

#[test]
fn s5_volatile_load_survives_a_preceding_store_to_the_same_address() {
    let mut ep = Entrypoint::new("s5");
    let ty = ep.alloc_type(TypeInfo::int(32, true).volatile());
    let bb = ep.alloc_block(None);

    let addr = push(&mut ep, bb, Opcode::SymAddr, ty, true);
    let addr_val = ep.insn(addr).target;
    let val = ep.alloc_val(7);
    let store = push(&mut ep, bb, Opcode::Store, ty, false);
    ep.insn_mut(store).src1 = addr_val;
    ep.insn_mut(store).src2 = val;

    let load = push(&mut ep, bb, Opcode::Load, ty, true);
    ep.insn_mut(load).src1 = addr_val;
    push(&mut ep, bb, Opcode::Ret, ty, false);

    let mut sink = LogWarningSink::default();
    let mut ctx = new_ctx(&mut sink);
    run_to_fixpoint(&mut ep, &mut ctx).unwrap();

    assert!(ep.insn(load).is_live());
}

#[test]
fn s6_switch_on_a_constant_scrutinee_folds_to_one_arm() {
    let mut ep = Entrypoint::new("s6");
    let ty = ep.alloc_type(TypeInfo::int(32, true));
    let entry = ep.alloc_block(None);
    let case0 = ep.alloc_block(None);
    let case1 = ep.alloc_block(None);
    let default = ep.alloc_block(None);
    ep.add_edge(entry, case0);
    ep.add_edge(entry, case1);
    ep.add_edge(entry, default);

    let scrutinee = ep.alloc_val(1);
    let mut sw = Instruction::new(Opcode::Switch, 32, Position::default(), ty);
    sw.multijmp_list = vec![
        MultiJmp { target: case0, begin: 0, end: 0 },
        MultiJmp { target: case1, begin: 1, end: 1 },
        MultiJmp { target: default, begin: 1, end: 0 },
    ];
    let sw_id = ep.alloc_instruction(sw, false);
    ep.insn_mut(sw_id).cond = scrutinee;
    ep.push_instruction(entry, sw_id);

    let mut sink = LogWarningSink::default();
    let mut ctx = new_ctx(&mut sink);
    run_to_fixpoint(&mut ep, &mut ctx).unwrap();

    assert_eq!(ep.insn(sw_id).opcode, Opcode::Br);
    assert_eq!(ep.insn(sw_id).bb_true, Some(case1));
    assert!(!ep.block(case0).parents.contains(&entry));
    assert!(!ep.block(default).parents.contains(&entry));
}

#[test]
fn validate_accepts_a_well_formed_entrypoint_after_simplification() {
    let mut ep = Entrypoint::new("valid");
    let ty = ep.alloc_type(TypeInfo::int(32, true));
    let bb = ep.alloc_block(None);
    push(&mut ep, bb, Opcode::Ret, ty, false);
    assert!(ep.validate().is_ok());
}
