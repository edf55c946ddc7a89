//! Use-list maintenance: the only place allowed to rewrite an operand slot.
//!
//! Every rewrite rule goes through `bind`/`unbind`/`retarget` rather than
//! touching `Instruction` fields directly, so the pseudo's `users` list can
//! never drift out of sync with what the instruction actually holds.

use crate::instruction::{Entrypoint, InsnId};
use crate::pseudo::{PseudoId, Slot};

/// Point `insn`'s `slot` at `new`, registering the use-list entry on `new`
/// (unless `new` is VOID or a VAL, which keep no use list).
pub fn bind(ep: &mut Entrypoint, insn: InsnId, slot: Slot, new: PseudoId) {
    ep.insn_mut(insn).set_slot(slot, new);
    if ep.pseudo(new).has_use_list() {
        let entry = (insn, slot);
        let users = &mut ep.pseudo_mut(new).users;
        if !users.contains(&entry) {
            users.push(entry);
        }
    }
}

/// Clear `insn`'s `slot` back to VOID, removing the use-list entry from
/// whatever pseudo previously occupied it.
pub fn unbind(ep: &mut Entrypoint, insn: InsnId, slot: Slot) {
    let old = ep.insn(insn).slot(slot);
    if ep.pseudo(old).has_use_list() {
        ep.pseudo_mut(old).users.retain(|&e| e != (insn, slot));
    }
    ep.insn_mut(insn).set_slot(slot, PseudoId::VOID);
}

/// Replace whatever pseudo occupies `slot` with `new` in one step: the
/// combination every rewrite rule actually wants (`unbind` then `bind` would
/// work too, but this avoids a transient VOID state other code might observe).
pub fn retarget(ep: &mut Entrypoint, insn: InsnId, slot: Slot, new: PseudoId) {
    let old = ep.insn(insn).slot(slot);
    if old == new {
        return;
    }
    if ep.pseudo(old).has_use_list() {
        ep.pseudo_mut(old).users.retain(|&e| e != (insn, slot));
    }
    ep.insn_mut(insn).set_slot(slot, new);
    if ep.pseudo(new).has_use_list() {
        let entry = (insn, slot);
        let users = &mut ep.pseudo_mut(new).users;
        if !users.contains(&entry) {
            users.push(entry);
        }
    }
}

/// Redirect every live user of `old` to `new`, except `old` itself won't be
/// touched (its own use-list is what we're draining). Mirrors the original's
/// `replace_pseudo_pseudo` walk over `old`'s use chain.
pub fn replace_all_uses(ep: &mut Entrypoint, old: PseudoId, new: PseudoId) {
    if old == new {
        return;
    }
    let users = ep.pseudo(old).users.clone();
    for (insn, slot) in users {
        if ep.insn(insn).is_live() {
            retarget(ep, insn, slot, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_type::TypeInfo;
    use crate::instruction::Instruction;
    use crate::opcode::Opcode;
    use crate::position::Position;

    fn add(ep: &mut Entrypoint) -> InsnId {
        let ty = ep.alloc_type(TypeInfo::int(32, true));
        ep.alloc_instruction(Instruction::new(Opcode::Add, 32, Position::default(), ty), true)
    }

    #[test]
    fn bind_registers_use_list_entry() {
        let mut ep = Entrypoint::new("f");
        let insn = add(&mut ep);
        let val = ep.alloc_val(7);
        bind(&mut ep, insn, Slot::Src1, val);
        assert_eq!(ep.insn(insn).src1, val);
        // VAL pseudos keep no use list, but a REG source should.
        let other = add(&mut ep);
        let target = ep.insn(other).target;
        bind(&mut ep, insn, Slot::Src2, target);
        assert!(ep.pseudo(target).users.contains(&(insn, Slot::Src2)));
    }

    #[test]
    fn retarget_moves_use_list_entry() {
        let mut ep = Entrypoint::new("f");
        let insn = add(&mut ep);
        let a = add(&mut ep);
        let b = add(&mut ep);
        let a_target = ep.insn(a).target;
        let b_target = ep.insn(b).target;
        bind(&mut ep, insn, Slot::Src1, a_target);
        retarget(&mut ep, insn, Slot::Src1, b_target);
        assert!(!ep.pseudo(a_target).users.contains(&(insn, Slot::Src1)));
        assert!(ep.pseudo(b_target).users.contains(&(insn, Slot::Src1)));
        assert_eq!(ep.insn(insn).src1, b_target);
    }

    #[test]
    fn replace_all_uses_redirects_every_live_user() {
        let mut ep = Entrypoint::new("f");
        let def = add(&mut ep);
        let def_target = ep.insn(def).target;
        let user1 = add(&mut ep);
        let user2 = add(&mut ep);
        bind(&mut ep, user1, Slot::Src1, def_target);
        bind(&mut ep, user2, Slot::Src2, def_target);
        let replacement = ep.alloc_val(42);
        replace_all_uses(&mut ep, def_target, replacement);
        assert_eq!(ep.insn(user1).src1, replacement);
        assert_eq!(ep.insn(user2).src2, replacement);
        assert!(!ep.pseudo(def_target).has_users());
    }
}
