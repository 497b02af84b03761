use super::*;
use goldboy_common::{
    ArithOp, BitwiseOp, Command, Condition, ControlOp, Flag, Operand, OperandKind, PostLoad,
    Register16, Register8, RotateOp, Suspend, Write, WriteTarget,
};

fn desc(machine_code: u32, byte_length: u8, duration: u8, params: Params) -> Descriptor {
    Descriptor {
        machine_code,
        byte_length,
        duration,
        params,
    }
}

fn only(descriptor: Descriptor) -> Trace {
    let mut traces = assemble(&descriptor).unwrap();
    assert_eq!(traces.len(), 1, "expected a single trace");
    traces.remove(0)
}

fn queue(commands: impl IntoIterator<Item = Command>) -> CommandQueue {
    commands.into_iter().collect()
}

fn w(write: Write) -> Command {
    Command::Write(write)
}

fn fetch(opcode: u8) -> [Command; 3] {
    [w(Write::pc(0x0001)), w(Write::ir(opcode)), Command::Halt]
}

fn flag(f: Flag, set: bool) -> Command {
    w(Write::flag(f, set))
}

fn alu8(machine_code: u32, byte_length: u8, duration: u8, op: ArithOp, rhs: Operand) -> Descriptor {
    desc(
        machine_code,
        byte_length,
        duration,
        Params::Arithmetic8 {
            op,
            lhs: Some(Operand::reg8(Register8::A)),
            rhs: Some(rhs),
        },
    )
}

fn hl_ptr() -> Operand {
    Operand::deref(OperandKind::Register16(Register16::HL))
}

fn load(machine_code: u32, byte_length: u8, duration: u8, dst: Operand, src: Operand) -> Descriptor {
    load_adjusted(machine_code, byte_length, duration, dst, src, PostLoad::None)
}

fn load_adjusted(
    machine_code: u32,
    byte_length: u8,
    duration: u8,
    dst: Operand,
    src: Operand,
    post_load: PostLoad,
) -> Descriptor {
    desc(
        machine_code,
        byte_length,
        duration,
        Params::Load {
            dst: Some(dst),
            src: Some(src),
            post_load,
        },
    )
}

fn jump(
    machine_code: u32,
    byte_length: u8,
    duration: u8,
    kind: JumpKind,
    condition: Option<Condition>,
    target: Option<OperandKind>,
) -> Descriptor {
    desc(
        machine_code,
        byte_length,
        duration,
        Params::Jump {
            kind,
            condition,
            target: target.map(Operand::direct),
        },
    )
}

fn outcome(traces: &[Trace], outcome: Outcome) -> &Trace {
    traces
        .iter()
        .find(|t| t.outcome == Some(outcome))
        .unwrap()
}

#[test]
fn add_a_b() {
    let trace = only(alu8(0x80, 1, 1, ArithOp::Add, Operand::reg8(Register8::B)));
    assert_eq!(trace.preset, PresetName::Default);
    let mut expected = queue(fetch(0x80));
    expected.extend([
        w(Write::register8(Register8::A, 0x15)),
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, true),
        flag(Flag::C, false),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn sub_b_wraps() {
    let trace = only(alu8(0x90, 1, 1, ArithOp::Sub, Operand::reg8(Register8::B)));
    let mut expected = queue(fetch(0x90));
    expected.extend([
        w(Write::register8(Register8::A, 0xFF)),
        flag(Flag::Z, false),
        flag(Flag::N, true),
        flag(Flag::H, true),
        flag(Flag::C, true),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn compare_writes_flags_only() {
    let trace = only(alu8(0xB8, 1, 1, ArithOp::Cp, Operand::reg8(Register8::B)));
    assert!(trace
        .queue
        .writes()
        .all(|w| !matches!(w.target(), WriteTarget::Register8(_))));
    assert_eq!(trace.queue.writes().filter(|w| matches!(w.target(), WriteTarget::Flag(_))).count(), 4);
}

#[test]
fn add_from_hl_pointer_reads_then_restores_buses() {
    let trace = only(alu8(0x86, 1, 2, ArithOp::Add, hl_ptr()));
    let mut expected = queue(fetch(0x86));
    expected.extend([
        w(Write::address_bus(0x0102)),
        w(Write::data_bus(0x02)),
        Command::Halt,
        w(Write::register8(Register8::A, 0x0C)),
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, false),
        flag(Flag::C, false),
        w(Write::address_bus(0x0001)),
        w(Write::data_bus(0x86)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn adc_immediate_folds_carry() {
    let trace = only(alu8(0xCE05, 2, 2, ArithOp::Adc, Operand::direct(OperandKind::Imm8(0x05))));
    let mut expected = queue(fetch(0xCE));
    expected.extend([
        w(Write::pc(0x0002)),
        w(Write::ir(0x05)),
        Command::Halt,
        w(Write::register8(Register8::A, 0x10)),
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, true),
        flag(Flag::C, false),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn inc_b_skips_carry() {
    let trace = only(desc(
        0x04,
        1,
        1,
        Params::Arithmetic8 {
            op: ArithOp::Inc,
            lhs: Some(Operand::reg8(Register8::B)),
            rhs: None,
        },
    ));
    let mut expected = queue(fetch(0x04));
    expected.extend([
        w(Write::register8(Register8::B, 0x0C)),
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, false),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn inc_hl_pointer_writes_back() {
    let trace = only(desc(
        0x34,
        1,
        3,
        Params::Arithmetic8 {
            op: ArithOp::Inc,
            lhs: Some(hl_ptr()),
            rhs: None,
        },
    ));
    let mut expected = queue(fetch(0x34));
    expected.extend([
        w(Write::address_bus(0x0102)),
        w(Write::data_bus(0x02)),
        Command::Halt,
        w(Write::data_bus(0x03)),
        w(Write::memory(0x0102, 0x03)),
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, false),
        Command::Halt,
        w(Write::address_bus(0x0001)),
        w(Write::data_bus(0x34)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn inc_dec_never_touch_carry() {
    let targets = [
        (0, Operand::reg8(Register8::B)),
        (1, Operand::reg8(Register8::C)),
        (2, Operand::reg8(Register8::D)),
        (3, Operand::reg8(Register8::E)),
        (4, Operand::reg8(Register8::H)),
        (5, Operand::reg8(Register8::L)),
        (6, hl_ptr()),
        (7, Operand::reg8(Register8::A)),
    ];
    for (index, operand) in targets {
        for (op, low) in [(ArithOp::Inc, 0x04), (ArithOp::Dec, 0x05)] {
            let code = (index << 3) | low;
            let duration = if operand.pointer { 3 } else { 1 };
            let trace = only(desc(
                code,
                1,
                duration,
                Params::Arithmetic8 {
                    op,
                    lhs: Some(operand),
                    rhs: None,
                },
            ));
            assert!(
                trace
                    .queue
                    .writes()
                    .all(|w| w.target() != WriteTarget::Flag(Flag::C)),
                "0x{code:02X} wrote the carry flag"
            );
        }
    }
}

#[test]
fn add_hl_sp_writes_both_flag_passes() {
    let trace = only(desc(
        0x39,
        1,
        2,
        Params::Arithmetic16 {
            op: ArithOp::Add,
            lhs: Some(Operand::reg16(Register16::HL)),
            rhs: Some(Operand::reg16(Register16::SP)),
        },
    ));
    let mut expected = queue(fetch(0x39));
    expected.extend([
        w(Write::register8(Register8::L, 0x01)),
        flag(Flag::N, false),
        flag(Flag::H, true),
        flag(Flag::C, true),
        Command::Halt,
        w(Write::register8(Register8::H, 0x02)),
        flag(Flag::N, false),
        flag(Flag::H, true),
        flag(Flag::C, false),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn add_hl_de_full_width_half_carry_comes_from_low_nibble() {
    let trace = only(desc(
        0x19,
        1,
        2,
        Params::Arithmetic16 {
            op: ArithOp::Add,
            lhs: Some(Operand::reg16(Register16::HL)),
            rhs: Some(Operand::reg16(Register16::DE)),
        },
    ));
    // 0x0102 + 0x0D0E: bit 11 stays clear but the low nibble carries.
    let mut expected = queue(fetch(0x19));
    expected.extend([
        w(Write::register8(Register8::L, 0x10)),
        flag(Flag::N, false),
        flag(Flag::H, true),
        flag(Flag::C, false),
        Command::Halt,
        w(Write::register8(Register8::H, 0x0E)),
        flag(Flag::N, false),
        flag(Flag::H, true),
        flag(Flag::C, false),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn inc_bc_is_flagless() {
    let trace = only(desc(
        0x03,
        1,
        2,
        Params::Arithmetic16 {
            op: ArithOp::Inc,
            lhs: Some(Operand::reg16(Register16::BC)),
            rhs: None,
        },
    ));
    let mut expected = queue(fetch(0x03));
    expected.extend([w(Write::register16(Register16::BC, 0x0B0D)), Command::Halt]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn add_sp_signed_uses_low_byte_flags() {
    let trace = only(desc(
        0xE8F0,
        2,
        4,
        Params::Arithmetic16 {
            op: ArithOp::Add,
            lhs: Some(Operand::reg16(Register16::SP)),
            rhs: Some(Operand::direct(OperandKind::SignedImm8(-16))),
        },
    ));
    assert_eq!(trace.preset, PresetName::Highstack);
    let mut expected = queue(fetch(0xE8));
    expected.extend([
        w(Write::pc(0x0002)),
        w(Write::ir(0xF0)),
        Command::Halt,
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, false),
        flag(Flag::C, true),
        Command::Halt,
        Command::Halt,
        w(Write::register16(Register16::SP, 0xBBEF)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn daa_and_ccf_on_default_flags() {
    let daa = only(desc(0x27, 1, 1, Params::Arithmetic8 { op: ArithOp::Daa, lhs: None, rhs: None }));
    // N, H and C set: 0x0A - 0x66
    assert!(daa.queue.writes().any(|w| *w == Write::register8(Register8::A, 0xA4)));
    assert!(daa.queue.writes().all(|w| w.target() != WriteTarget::Flag(Flag::N)));

    let ccf = only(desc(0x3F, 1, 1, Params::Arithmetic8 { op: ArithOp::Ccf, lhs: None, rhs: None }));
    let mut expected = queue(fetch(0x3F));
    expected.extend([flag(Flag::N, false), flag(Flag::H, false), flag(Flag::C, false)]);
    assert_eq!(ccf.queue, expected);
}

fn bitwise(code: u32, duration: u8, op: BitwiseOp, bit: u8, operand: Operand) -> Descriptor {
    desc(
        code,
        2,
        duration,
        Params::Bitwise {
            op,
            bit: Some(bit),
            operand: Some(operand),
        },
    )
}

#[test]
fn bit_zero_of_a() {
    let trace = only(bitwise(0xCB47, 2, BitwiseOp::Bit, 0, Operand::reg8(Register8::A)));
    let mut expected = queue(fetch(0xCB));
    expected.extend([
        w(Write::pc(0x0002)),
        w(Write::ir(0x47)),
        Command::Halt,
        flag(Flag::Z, true),
        flag(Flag::N, false),
        flag(Flag::H, true),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn res_hl_pointer_reads_then_writes_back() {
    let trace = only(bitwise(0xCB8E, 4, BitwiseOp::Res, 1, hl_ptr()));
    let mut expected = queue(fetch(0xCB));
    expected.extend([
        w(Write::pc(0x0002)),
        w(Write::ir(0x8E)),
        Command::Halt,
        Command::Halt,
        w(Write::memory(0x0102, 0x00)),
        Command::Halt,
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn set_register_from_block_offset() {
    // SET 7,B
    let trace = only(bitwise(0xCBF8, 2, BitwiseOp::Set, 7, Operand::reg8(Register8::B)));
    assert_eq!(
        trace.queue.writes().last(),
        Some(&Write::register8(Register8::B, 0x8B))
    );
}

#[test]
fn bit_number_must_match_payload() {
    let err = assemble(&bitwise(0xCB47, 2, BitwiseOp::Bit, 3, Operand::reg8(Register8::A))).unwrap_err();
    assert!(matches!(err, GenerateError::Malformed { machine_code: 0xCB47, .. }));
}

#[test]
fn rotate_accumulator_clears_zero() {
    let trace = only(desc(0x07, 1, 1, Params::Rotate { op: RotateOp::Rlc, operand: None }));
    let mut expected = queue(fetch(0x07));
    expected.extend([
        w(Write::register8(Register8::A, 0x14)),
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, false),
        flag(Flag::C, false),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn rotate_cb_through_carry() {
    let trace = only(desc(
        0xCB11,
        2,
        2,
        Params::Rotate {
            op: RotateOp::Rl,
            operand: Some(Operand::reg8(Register8::C)),
        },
    ));
    assert_eq!(
        trace.queue.writes().nth(4),
        Some(&Write::register8(Register8::C, 0x19))
    );

    let swap_hl = only(desc(
        0xCB36,
        2,
        4,
        Params::Rotate {
            op: RotateOp::Swap,
            operand: Some(hl_ptr()),
        },
    ));
    assert!(swap_hl.queue.writes().any(|w| *w == Write::memory(0x0102, 0x20)));
}

#[test]
fn load_register_to_register() {
    let trace = only(load(0x78, 1, 1, Operand::reg8(Register8::A), Operand::reg8(Register8::B)));
    let mut expected = queue(fetch(0x78));
    expected.push(Write::register8(Register8::A, 0x0B));
    assert_eq!(trace.queue, expected);
}

#[test]
fn load_through_hl_with_increment() {
    let trace = only(load_adjusted(
        0x2A,
        1,
        2,
        Operand::reg8(Register8::A),
        hl_ptr(),
        PostLoad::Increment,
    ));
    let mut expected = queue(fetch(0x2A));
    expected.extend([
        w(Write::register16(Register16::HL, 0x0103)),
        Command::Halt,
        w(Write::register8(Register8::A, 0x02)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn store_through_hl_with_decrement() {
    let trace = only(load_adjusted(
        0x32,
        1,
        2,
        hl_ptr(),
        Operand::reg8(Register8::A),
        PostLoad::Decrement,
    ));
    let mut expected = queue(fetch(0x32));
    expected.extend([
        w(Write::memory(0x0102, 0x0A)),
        w(Write::register16(Register16::HL, 0x0101)),
        Command::Halt,
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn load_sixteen_bit_immediate() {
    let trace = only(load(
        0x01CDAB,
        3,
        3,
        Operand::reg16(Register16::BC),
        Operand::direct(OperandKind::Imm16(0xABCD)),
    ));
    let mut expected = queue(fetch(0x01));
    expected.extend([
        w(Write::pc(0x0002)),
        w(Write::ir(0xCD)),
        Command::Halt,
        w(Write::pc(0x0003)),
        w(Write::ir(0xAB)),
        Command::Halt,
        w(Write::register16(Register16::BC, 0xABCD)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn push_hl() {
    let trace = only(load(
        0xE5,
        1,
        4,
        Operand::deref(OperandKind::Register16(Register16::SP)),
        Operand::reg16(Register16::HL),
    ));
    assert_eq!(trace.preset, PresetName::Highstack);
    let mut expected = queue(fetch(0xE5));
    expected.extend([
        w(Write::register16(Register16::SP, 0xBBFE)),
        Command::Halt,
        w(Write::memory(0xBBFE, 0x01)),
        w(Write::register16(Register16::SP, 0xBBFD)),
        Command::Halt,
        w(Write::memory(0xBBFD, 0x02)),
        Command::Halt,
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn pop_af_masks_flags() {
    let trace = only(load(
        0xF1,
        1,
        3,
        Operand::reg16(Register16::AF),
        Operand::deref(OperandKind::Register16(Register16::SP)),
    ));
    let mut expected = queue(fetch(0xF1));
    expected.extend([
        w(Write::register16(Register16::SP, 0xBC00)),
        Command::Halt,
        w(Write::register16(Register16::SP, 0xBC01)),
        Command::Halt,
        w(Write::register16(Register16::AF, 0x00F0)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn store_stack_pointer_low_byte_first() {
    let trace = only(load(
        0x0800C0,
        3,
        5,
        Operand::deref(OperandKind::Imm16(0xC000)),
        Operand::reg16(Register16::SP),
    ));
    let tail: Vec<_> = trace.queue.commands()[9..].to_vec();
    assert_eq!(
        tail,
        vec![
            w(Write::memory(0xC000, 0xFF)),
            Command::Halt,
            w(Write::memory(0xC001, 0xBB)),
            Command::Halt,
        ]
    );
}

#[test]
fn high_page_loads() {
    let ldh = only(load(
        0xF0BC,
        2,
        3,
        Operand::reg8(Register8::A),
        Operand::deref(OperandKind::Imm8(0xBC)),
    ));
    assert_eq!(ldh.queue.writes().last(), Some(&Write::register8(Register8::A, 0xBC)));

    let port = only(load(
        0xE2,
        1,
        2,
        Operand::deref(OperandKind::Register8(Register8::C)),
        Operand::reg8(Register8::A),
    ));
    let mut expected = queue(fetch(0xE2));
    expected.extend([w(Write::memory(0xFF0C, 0x0A)), Command::Halt]);
    assert_eq!(port.queue, expected);
}

#[test]
fn hl_from_stack_offset_carries_into_high_byte() {
    let trace = only(load_adjusted(
        0xF8F0,
        2,
        3,
        Operand::reg16(Register16::HL),
        Operand::reg16(Register16::SP),
        PostLoad::AddSigned(-16),
    ));
    let mut expected = queue(fetch(0xF8));
    expected.extend([
        w(Write::pc(0x0002)),
        w(Write::ir(0xF0)),
        Command::Halt,
        w(Write::register8(Register8::L, 0xEF)),
        flag(Flag::Z, false),
        flag(Flag::N, false),
        flag(Flag::H, false),
        flag(Flag::C, true),
        Command::Halt,
        w(Write::register8(Register8::H, 0xBB)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn hl_from_stack_offset_sets_zero_when_low_byte_wraps() {
    let trace = only(load_adjusted(
        0xF801,
        2,
        3,
        Operand::reg16(Register16::HL),
        Operand::reg16(Register16::SP),
        PostLoad::AddSigned(1),
    ));
    let mut expected = queue(fetch(0xF8));
    expected.extend([
        w(Write::pc(0x0002)),
        w(Write::ir(0x01)),
        Command::Halt,
        w(Write::register8(Register8::L, 0x00)),
        flag(Flag::Z, true),
        flag(Flag::N, false),
        flag(Flag::H, true),
        flag(Flag::C, true),
        Command::Halt,
        w(Write::register8(Register8::H, 0xBC)),
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn conditional_jump_outcomes() {
    let traces = assemble(&jump(
        0xC2CDAB,
        3,
        4,
        JumpKind::Jp,
        Some(Condition::NotZero),
        Some(OperandKind::Imm16(0xABCD)),
    ))
    .unwrap();
    assert_eq!(traces.len(), 2);

    let prefix = {
        let mut q = queue(fetch(0xC2));
        q.extend([
            w(Write::pc(0x0002)),
            w(Write::ir(0xCD)),
            Command::Halt,
            w(Write::pc(0x0003)),
            w(Write::ir(0xAB)),
            Command::Halt,
        ]);
        q
    };

    let not_taken = outcome(&traces, Outcome::NotTaken);
    assert_eq!(not_taken.preset, PresetName::Highstack);
    assert_eq!(not_taken.queue, prefix);

    let taken = outcome(&traces, Outcome::Taken);
    assert_eq!(taken.preset, PresetName::Nznc);
    let mut expected = prefix.clone();
    expected.extend([w(Write::pc(0xABCD)), w(Write::ir(0xCD)), Command::Halt]);
    assert_eq!(taken.queue, expected);
}

#[test]
fn carry_condition_is_taken_under_highstack() {
    let traces = assemble(&jump(
        0x38FE,
        2,
        3,
        JumpKind::Jr,
        Some(Condition::Carry),
        Some(OperandKind::SignedImm8(-2)),
    ))
    .unwrap();
    assert_eq!(outcome(&traces, Outcome::Taken).preset, PresetName::Highstack);
    assert_eq!(outcome(&traces, Outcome::NotTaken).preset, PresetName::Nznc);
    assert_eq!(outcome(&traces, Outcome::NotTaken).queue.halt_count(), 2);
}

#[test]
fn relative_jump_wraps_from_next_instruction() {
    let trace = only(jump(0x18FE, 2, 3, JumpKind::Jr, None, Some(OperandKind::SignedImm8(-2))));
    let tail: Vec<_> = trace.queue.commands()[6..].to_vec();
    assert_eq!(tail, vec![w(Write::pc(0x0000)), w(Write::ir(0x00)), Command::Halt]);

    let back = only(jump(0x18F0, 2, 3, JumpKind::Jr, None, Some(OperandKind::SignedImm8(-16))));
    assert!(back.queue.writes().any(|w| *w == Write::pc(0xFFF2)));
}

#[test]
fn jump_to_hl_is_single_cycle() {
    let trace = only(desc(
        0xE9,
        1,
        1,
        Params::Jump {
            kind: JumpKind::Jp,
            condition: None,
            target: Some(hl_ptr()),
        },
    ));
    let mut expected = queue(fetch(0xE9));
    expected.extend([w(Write::pc(0x0102)), w(Write::ir(0x02))]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn call_pushes_return_address_high_first() {
    let trace = only(jump(0xCD3412, 3, 6, JumpKind::Call, None, Some(OperandKind::Imm16(0x1234))));
    let tail: Vec<_> = trace.queue.commands()[9..].to_vec();
    assert_eq!(
        tail,
        vec![
            w(Write::register16(Register16::SP, 0xBBFE)),
            Command::Halt,
            w(Write::memory(0xBBFE, 0x00)),
            w(Write::register16(Register16::SP, 0xBBFD)),
            Command::Halt,
            w(Write::memory(0xBBFD, 0x03)),
            Command::Halt,
            w(Write::pc(0x1234)),
            w(Write::ir(0x34)),
        ]
    );
}

#[test]
fn conditional_call_not_taken_skips_push() {
    let traces = assemble(&jump(
        0xC43412,
        3,
        6,
        JumpKind::Call,
        Some(Condition::NotZero),
        Some(OperandKind::Imm16(0x1234)),
    ))
    .unwrap();
    let not_taken = outcome(&traces, Outcome::NotTaken);
    assert_eq!(not_taken.queue.halt_count(), 3);
    assert!(not_taken
        .queue
        .writes()
        .all(|w| !matches!(w.target(), WriteTarget::Memory(_))));
}

#[test]
fn ret_pops_low_byte_first() {
    let trace = only(jump(0xC9, 1, 4, JumpKind::Ret, None, None));
    let mut expected = queue(fetch(0xC9));
    expected.extend([
        w(Write::register16(Register16::SP, 0xBC00)),
        Command::Halt,
        w(Write::register16(Register16::SP, 0xBC01)),
        Command::Halt,
        w(Write::pc(0x00FF)),
        w(Write::ir(0xFF)),
        Command::Halt,
    ]);
    assert_eq!(trace.queue, expected);
}

#[test]
fn reti_enables_interrupts() {
    let trace = only(jump(0xD9, 1, 4, JumpKind::Reti, None, None));
    assert!(trace.queue.writes().any(|w| *w == Write::ime(true)));
}

#[test]
fn conditional_ret_checks_before_popping() {
    let traces = assemble(&jump(0xC8, 1, 5, JumpKind::Ret, Some(Condition::Zero), None)).unwrap();
    let not_taken = outcome(&traces, Outcome::NotTaken);
    assert_eq!(not_taken.preset, PresetName::Nznc);
    let mut expected = queue(fetch(0xC8));
    expected.halt();
    assert_eq!(not_taken.queue, expected);
    assert_eq!(outcome(&traces, Outcome::Taken).queue.halt_count(), 5);
}

#[test]
fn rst_calls_its_vector() {
    let trace = only(jump(0xEF, 1, 4, JumpKind::Rst, None, None));
    let tail: Vec<_> = trace.queue.commands()[3..].to_vec();
    assert_eq!(
        tail,
        vec![
            w(Write::register16(Register16::SP, 0xBBFE)),
            Command::Halt,
            w(Write::memory(0xBBFE, 0x00)),
            w(Write::register16(Register16::SP, 0xBBFD)),
            Command::Halt,
            w(Write::memory(0xBBFD, 0x01)),
            Command::Halt,
            w(Write::pc(0x0028)),
            w(Write::ir(0x28)),
        ]
    );
}

#[test]
fn control_ops() {
    let halt = only(desc(0x76, 1, 1, Params::Control { op: ControlOp::Halt }));
    let mut expected = queue(fetch(0x76));
    expected.push(Command::Suspend(Suspend::Halt));
    assert_eq!(halt.queue, expected);

    let ei = only(desc(0xFB, 1, 1, Params::Control { op: ControlOp::Ei }));
    assert_eq!(ei.queue.writes().last(), Some(&Write::ime(true)));

    let nop = only(desc(0x00, 1, 1, Params::Control { op: ControlOp::Nop }));
    assert_eq!(nop.queue, queue(fetch(0x00)));
}

#[test]
fn wrong_duration_is_malformed() {
    let err = assemble(&alu8(0x86, 1, 1, ArithOp::Add, hl_ptr())).unwrap_err();
    assert!(matches!(err, GenerateError::Malformed { .. }));
}

#[test]
fn missing_operand_is_malformed() {
    let err = assemble(&desc(
        0x80,
        1,
        1,
        Params::Arithmetic8 {
            op: ArithOp::Add,
            lhs: Some(Operand::reg8(Register8::A)),
            rhs: None,
        },
    ))
    .unwrap_err();
    assert!(matches!(err, GenerateError::Malformed { .. }));
}

#[test]
fn immediate_must_match_instruction_bytes() {
    let err = assemble(&alu8(0xC605, 2, 2, ArithOp::Add, Operand::direct(OperandKind::Imm8(0x06))))
        .unwrap_err();
    assert!(matches!(err, GenerateError::Malformed { .. }));
}

#[test]
fn unknown_shapes_are_unsupported() {
    let err = assemble(&load(0x00, 1, 1, hl_ptr(), hl_ptr())).unwrap_err();
    assert!(matches!(err, GenerateError::Unsupported { .. }));

    let err = assemble(&desc(
        0x80,
        1,
        1,
        Params::Arithmetic8 {
            op: ArithOp::Add,
            lhs: Some(Operand::reg8(Register8::B)),
            rhs: Some(Operand::reg8(Register8::C)),
        },
    ))
    .unwrap_err();
    assert!(matches!(err, GenerateError::Unsupported { .. }));
}
