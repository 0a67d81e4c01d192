//! Instruction emission with back-patched static data and a top-down heap.
//!
//! Emission runs in one pass over the AST. Slot-addressed operand bytes are
//! emitted as placeholders and recorded in a fixup list; after the trailing
//! `BRK`, static slots are laid out contiguously past the code and every
//! fixup is patched (labels-then-layout, in place of the original's
//! in-buffer `T<i>` markers). Branch offsets are computed from emitted
//! positions. String literals are pooled and copied into the heap from the
//! top of the image downward.

use finch_image::{IMAGE_SIZE, Image, SCRATCH_ADDR, opcodes};
use indexmap::IndexMap;

use crate::analyze::{Ast, AstId, AstKind, ScopeId, SymbolTable, VarType};
use crate::diagnostics::{Diagnostics, Stage};

use super::EmitError;

/// Emits one program. The symbol table is the analyzer's; its one-shot
/// `traversed` flags drive the scope descent, so each table supports a
/// single emission pass.
pub fn generate(
    ast: &Ast,
    symbols: &mut SymbolTable,
    diag: &mut Diagnostics,
) -> Result<Image, EmitError> {
    let mut generator = CodeGenerator {
        ast,
        symbols,
        diag,
        image: Image::new(),
        code_end: 0,
        heap_start: IMAGE_SIZE,
        slots: Vec::new(),
        fixups: Vec::new(),
        strings: IndexMap::new(),
        scope: None,
    };

    if !ast.is_empty() {
        generator.block(ast.root())?;
    }
    generator.emit(&[opcodes::BRK])?;
    generator.backpatch()?;
    Ok(generator.image)
}

/// One byte of static data: a declared variable (name + declaring scope) or
/// an expression temporary.
#[derive(Debug)]
struct StaticSlot {
    name: Option<String>,
    scope: Option<ScopeId>,
}

/// A slot-addressed operand byte awaiting its final address.
#[derive(Debug)]
struct Fixup {
    offset: usize,
    slot: usize,
}

struct CodeGenerator<'a> {
    ast: &'a Ast,
    symbols: &'a mut SymbolTable,
    diag: &'a mut Diagnostics,
    image: Image,
    code_end: usize,
    /// Lowest heap byte in use; allocations move it down.
    heap_start: usize,
    slots: Vec<StaticSlot>,
    fixups: Vec<Fixup>,
    /// Literal pool: identical strings share one heap copy.
    strings: IndexMap<String, u8>,
    scope: Option<ScopeId>,
}

impl CodeGenerator<'_> {
    /// Code may not grow into the heap or the scratch byte.
    fn code_limit(&self) -> usize {
        self.heap_start.min(SCRATCH_ADDR as usize)
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), EmitError> {
        for &byte in bytes {
            if self.code_end >= self.code_limit() {
                return Err(EmitError::ImageOverflow);
            }
            self.image[self.code_end] = byte;
            self.code_end += 1;
        }
        Ok(())
    }

    /// Opcode + two-byte operand referring to a static slot; the low byte
    /// is patched later.
    fn emit_op_slot(&mut self, op: u8, slot: usize) -> Result<(), EmitError> {
        self.emit(&[op])?;
        let offset = self.code_end;
        self.emit(&[0x00, 0x00])?;
        self.fixups.push(Fixup { offset, slot });
        Ok(())
    }

    /// Opcode + two-byte operand addressing the scratch byte.
    fn emit_op_scratch(&mut self, op: u8) -> Result<(), EmitError> {
        self.emit(&[op, SCRATCH_ADDR, 0x00])
    }

    fn new_named_slot(&mut self, name: &str, scope: ScopeId) -> usize {
        self.slots.push(StaticSlot {
            name: Some(name.to_string()),
            scope: Some(scope),
        });
        self.slots.len() - 1
    }

    fn new_temp_slot(&mut self) -> usize {
        self.slots.push(StaticSlot {
            name: None,
            scope: None,
        });
        self.slots.len() - 1
    }

    /// Slot of the identifier, resolved by parent walk from the current
    /// scope: the slot whose declaring scope matches the resolution.
    fn slot_of_ident(&self, ident: AstId) -> usize {
        let name = self.ast.text(ident);
        let scope = self
            .symbols
            .resolve(self.scope.expect("identifier outside any block"), name)
            .expect("analysis resolved identifiers");
        self.slots
            .iter()
            .position(|s| s.name.as_deref() == Some(name) && s.scope == Some(scope))
            .expect("declaration allocated a slot")
    }

    /// Copies the literal plus a trailing `00` into the heap, top-down.
    /// Identical literals share one copy.
    fn alloc_string(&mut self, text: &str) -> Result<u8, EmitError> {
        if let Some(&addr) = self.strings.get(text) {
            return Ok(addr);
        }

        let len = text.len() + 1;
        if self.heap_start < len || self.heap_start - len < self.code_end {
            return Err(EmitError::ImageOverflow);
        }
        self.heap_start -= len;
        for (i, byte) in text.bytes().enumerate() {
            self.image[self.heap_start + i] = byte;
        }
        self.image[self.heap_start + len - 1] = 0x00;

        let addr = self.heap_start as u8;
        self.strings.insert(text.to_string(), addr);
        self.diag.debug(
            Stage::CodeGen,
            format!("Allocated string \"{}\" at 0x{:02X}", text, addr),
        );
        Ok(addr)
    }

    fn block(&mut self, block: AstId) -> Result<(), EmitError> {
        let enclosing = self.scope;
        self.scope = Some(self.symbols.descend(enclosing));

        for &child in self.ast.children(block) {
            self.statement(child)?;
        }

        self.scope = enclosing;
        Ok(())
    }

    fn statement(&mut self, statement: AstId) -> Result<(), EmitError> {
        let kind = self.ast.kind(statement);
        if kind != AstKind::Block {
            self.diag
                .debug(Stage::CodeGen, format!("Emitting {:?} statement", kind));
        }
        match kind {
            AstKind::Declare => self.declare(statement),
            AstKind::Assign => self.assign(statement),
            AstKind::Print => self.print(statement),
            AstKind::If => self.if_statement(statement),
            AstKind::While => self.while_statement(statement),
            AstKind::Block => self.block(statement),
            other => unreachable!("not a statement kind: {:?}", other),
        }
    }

    /// Reserve the slot; zero-initialize ints and booleans.
    fn declare(&mut self, declare: AstId) -> Result<(), EmitError> {
        let type_leaf = self.ast.child(declare, 0);
        let name_leaf = self.ast.child(declare, 1);
        let ty = VarType::from_keyword(
            self.ast
                .token(type_leaf)
                .expect("type leaf has a token")
                .kind,
        );
        let scope = self.scope.expect("declaration outside any block");
        let slot = self.new_named_slot(self.ast.text(name_leaf), scope);

        if ty != VarType::String {
            self.emit(&[opcodes::LDA_CONST, 0x00])?;
            self.emit_op_slot(opcodes::STA_MEM, slot)?;
        }
        Ok(())
    }

    fn assign(&mut self, assign: AstId) -> Result<(), EmitError> {
        let target = self.ast.child(assign, 0);
        let value = self.ast.child(assign, 1);

        self.value_into_acc(value)?;
        let slot = self.slot_of_ident(target);
        self.emit_op_slot(opcodes::STA_MEM, slot)
    }

    /// Leaves the value of any expression in the accumulator.
    fn value_into_acc(&mut self, value: AstId) -> Result<(), EmitError> {
        match self.ast.kind(value) {
            AstKind::IntLiteral => {
                let digit = digit_value(self.ast.text(value));
                self.emit(&[opcodes::LDA_CONST, digit])
            }
            AstKind::BoolLiteral => {
                self.emit(&[opcodes::LDA_CONST, bool_value(self.ast.text(value))])
            }
            AstKind::StringLiteral => {
                let addr = self.alloc_string(self.ast.text(value))?;
                self.emit(&[opcodes::LDA_CONST, addr])
            }
            AstKind::Ident => {
                let slot = self.slot_of_ident(value);
                self.emit_op_slot(opcodes::LDA_MEM, slot)
            }
            AstKind::Add => self.add_chain(value).map(|_| ()),
            AstKind::IsEq | AstKind::IsNotEq => self.comparison(value),
            other => unreachable!("not a value kind: {:?}", other),
        }
    }

    fn print(&mut self, print: AstId) -> Result<(), EmitError> {
        let value = self.ast.child(print, 0);
        match self.ast.kind(value) {
            AstKind::IntLiteral => {
                self.emit(&[opcodes::LDY_CONST, digit_value(self.ast.text(value))])?;
                self.emit(&[opcodes::LDX_CONST, 0x01])?;
                self.emit(&[opcodes::SYS])
            }
            AstKind::BoolLiteral => {
                self.emit(&[opcodes::LDY_CONST, bool_value(self.ast.text(value))])?;
                self.emit(&[opcodes::LDX_CONST, 0x01])?;
                self.emit(&[opcodes::SYS])
            }
            AstKind::StringLiteral => {
                let addr = self.alloc_string(self.ast.text(value))?;
                self.emit(&[opcodes::LDY_CONST, addr])?;
                self.emit(&[opcodes::LDX_CONST, 0x02])?;
                self.emit(&[opcodes::SYS])
            }
            AstKind::Ident => {
                let name = self.ast.text(value);
                let scope = self
                    .symbols
                    .resolve(self.scope.expect("print outside any block"), name)
                    .expect("analysis resolved identifiers");
                let ty = self
                    .symbols
                    .symbol(scope, name)
                    .expect("resolved symbol exists")
                    .ty;
                let slot = self.slot_of_ident(value);
                self.emit_op_slot(opcodes::LDY_MEM, slot)?;
                let mode = if ty == VarType::String { 0x02 } else { 0x01 };
                self.emit(&[opcodes::LDX_CONST, mode])?;
                self.emit(&[opcodes::SYS])
            }
            AstKind::Add => {
                let slot = self.add_chain(value)?;
                self.emit_op_slot(opcodes::LDY_MEM, slot)?;
                self.emit(&[opcodes::LDX_CONST, 0x01])?;
                self.emit(&[opcodes::SYS])
            }
            AstKind::IsEq | AstKind::IsNotEq => {
                // Stage the 0/1 result in the scratch byte, print it as an
                // integer, then restore the statement invariant.
                self.comparison(value)?;
                self.emit_op_scratch(opcodes::STA_MEM)?;
                self.emit_op_scratch(opcodes::LDY_MEM)?;
                self.emit(&[opcodes::LDX_CONST, 0x01])?;
                self.emit(&[opcodes::SYS])?;
                self.emit(&[opcodes::LDA_CONST, 0x00])?;
                self.emit_op_scratch(opcodes::STA_MEM)
            }
            other => unreachable!("not a printable kind: {:?}", other),
        }
    }

    /// `Add(digit, rest)`: the chain accumulates into one temporary slot.
    /// A nested `Add` keeps using its own slot; a leaf tail gets the slot
    /// seeded with its value. Returns the slot, with the sum also in the
    /// accumulator.
    fn add_chain(&mut self, add: AstId) -> Result<usize, EmitError> {
        let digit = self.ast.child(add, 0);
        let rest = self.ast.child(add, 1);

        let slot = match self.ast.kind(rest) {
            AstKind::Add => self.add_chain(rest)?,
            AstKind::IntLiteral => {
                let slot = self.new_temp_slot();
                self.emit(&[opcodes::LDA_CONST, digit_value(self.ast.text(rest))])?;
                self.emit_op_slot(opcodes::STA_MEM, slot)?;
                slot
            }
            AstKind::Ident => {
                let slot = self.new_temp_slot();
                let source = self.slot_of_ident(rest);
                self.emit_op_slot(opcodes::LDA_MEM, source)?;
                self.emit_op_slot(opcodes::STA_MEM, slot)?;
                slot
            }
            other => unreachable!("type checking rejects {:?} in int expression", other),
        };

        self.emit(&[opcodes::LDA_CONST, digit_value(self.ast.text(digit))])?;
        self.emit_op_slot(opcodes::ADC_MEM, slot)?;
        self.emit_op_slot(opcodes::STA_MEM, slot)?;
        Ok(slot)
    }

    /// Stages both operands in fresh temporaries, compares with `LDX`/`CPX`,
    /// and leaves 1 in the accumulator iff the comparison holds. The `BNE`
    /// offset skips exactly the trailing `LDA #imm`.
    fn comparison(&mut self, cmp: AstId) -> Result<(), EmitError> {
        let lhs = self.ast.child(cmp, 0);
        let rhs = self.ast.child(cmp, 1);

        let first = self.new_temp_slot();
        self.value_into_acc(lhs)?;
        self.emit_op_slot(opcodes::STA_MEM, first)?;

        let second = self.new_temp_slot();
        self.value_into_acc(rhs)?;
        self.emit_op_slot(opcodes::STA_MEM, second)?;

        self.emit_op_slot(opcodes::LDX_MEM, second)?;
        self.emit_op_slot(opcodes::CPX_MEM, first)?;

        let (on_equal, on_not_equal) = if self.ast.kind(cmp) == AstKind::IsEq {
            (0x01, 0x00)
        } else {
            (0x00, 0x01)
        };
        self.emit(&[opcodes::LDA_CONST, on_not_equal])?;
        self.emit(&[opcodes::BNE])?;
        let skip_at = self.code_end;
        self.emit(&[0x00])?;
        self.emit(&[opcodes::LDA_CONST, on_equal])?;
        self.patch_forward(skip_at);
        Ok(())
    }

    /// Condition value in the accumulator. The grammar restricts conditions
    /// to boolean literals and comparisons.
    fn condition_into_acc(&mut self, cond: AstId) -> Result<(), EmitError> {
        match self.ast.kind(cond) {
            AstKind::BoolLiteral => {
                self.emit(&[opcodes::LDA_CONST, bool_value(self.ast.text(cond))])
            }
            AstKind::IsEq | AstKind::IsNotEq => self.comparison(cond),
            other => unreachable!("not a condition kind: {:?}", other),
        }
    }

    /// Compare the condition value against X=1 and branch forward over the
    /// block; the offset is patched once the block's extent is known.
    fn if_statement(&mut self, statement: AstId) -> Result<(), EmitError> {
        let cond = self.ast.child(statement, 0);
        let body = self.ast.child(statement, 1);

        self.condition_into_acc(cond)?;
        let jump_at = self.emit_condition_check()?;
        self.block(body)?;
        self.patch_forward(jump_at);
        Ok(())
    }

    /// Same check as `if`, plus an always-taken backward branch after the
    /// block: comparing X=1 against the zeroed scratch byte forces Z clear,
    /// and the wrapped offset lands back on the condition.
    fn while_statement(&mut self, statement: AstId) -> Result<(), EmitError> {
        let cond = self.ast.child(statement, 0);
        let body = self.ast.child(statement, 1);

        let cond_start = self.code_end;
        self.condition_into_acc(cond)?;
        let jump_at = self.emit_condition_check()?;
        self.block(body)?;

        self.emit(&[opcodes::LDA_CONST, 0x00])?;
        self.emit_op_scratch(opcodes::STA_MEM)?;
        self.emit(&[opcodes::LDX_CONST, 0x01])?;
        self.emit_op_scratch(opcodes::CPX_MEM)?;
        self.emit(&[opcodes::BNE])?;
        let back_at = self.code_end;
        self.emit(&[0x00])?;
        let distance = back_at + 1 - cond_start;
        self.image[back_at] = (IMAGE_SIZE - distance) as u8;

        self.patch_forward(jump_at);
        Ok(())
    }

    /// `STA ff; LDX #01; CPX ff; LDA #00; STA ff; BNE <patched>`. Restoring
    /// the scratch byte between `CPX` and `BNE` is safe: only `CPX` touches
    /// the Z flag. Returns the offset-byte position to patch.
    fn emit_condition_check(&mut self) -> Result<usize, EmitError> {
        self.emit_op_scratch(opcodes::STA_MEM)?;
        self.emit(&[opcodes::LDX_CONST, 0x01])?;
        self.emit_op_scratch(opcodes::CPX_MEM)?;
        self.emit(&[opcodes::LDA_CONST, 0x00])?;
        self.emit_op_scratch(opcodes::STA_MEM)?;
        self.emit(&[opcodes::BNE])?;
        let jump_at = self.code_end;
        self.emit(&[0x00])?;
        Ok(jump_at)
    }

    fn patch_forward(&mut self, jump_at: usize) {
        let distance = self.code_end - (jump_at + 1);
        self.image[jump_at] = distance as u8;
    }

    /// Lays the static region out contiguously past the code and resolves
    /// every recorded slot reference.
    fn backpatch(&mut self) -> Result<(), EmitError> {
        let base = self.code_end;
        if base + self.slots.len() > self.heap_start.min(SCRATCH_ADDR as usize) {
            return Err(EmitError::ImageOverflow);
        }

        for fixup in &self.fixups {
            self.image[fixup.offset] = (base + fixup.slot) as u8;
        }
        self.diag.debug(
            Stage::CodeGen,
            format!(
                "Backpatched {} slot reference(s); static data at 0x{:02X}, heap at 0x{:02X}",
                self.fixups.len(),
                base,
                self.heap_start
            ),
        );
        Ok(())
    }
}

/// `'0'..='9'` → 0..=9.
fn digit_value(text: &str) -> u8 {
    text.as_bytes()[0] - b'0'
}

fn bool_value(text: &str) -> u8 {
    (text == "true") as u8
}
