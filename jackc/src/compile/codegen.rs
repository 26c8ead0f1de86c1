use std::io;

use log::debug;
use smol_str::SmolStr;

use super::{
    labels::{Label, LabelAllocator, LabelKind},
    symbol::{Symbol, SymbolKind, SymbolTable},
    vm_writer::{Command, Segment, VmWriter},
    CompilerConf, IfLabels, OperatorOrder,
};
use crate::{
    error::{CompileError, CompileErrorKind, JackError, JackResult},
    lex::Span,
    parsing::{
        BinaryOp, Block, Class, ClassVarKind, DoStmt, Expr, Ident, IfStmt, KeywordConst, LetStmt,
        Operand, ReturnStmt, Stmt, SubroutineCall, SubroutineDec, SubroutineKind, Term, Type,
        UnaryOp, WhileStmt, MAX_INT,
    },
};

/// Code generator.
///
/// Walks the tree of one class and writes its instructions to the sink
/// as it goes. The class scope lives as long as the class, and the
/// subroutine scope is replaced at every subroutine.
pub struct CodeGen<'a, W> {
    /// Source of the class, for error locations.
    source: &'a str,
    conf: CompilerConf,
    out: VmWriter<W>,
    class_name: SmolStr,
    class_symbols: SymbolTable,
    subroutine_symbols: SymbolTable,
    labels: LabelAllocator,
}

/// Operator waiting for its operands in deferred order.
#[derive(Debug, Clone, Copy)]
enum PendingOp {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl<'a, W: io::Write> CodeGen<'a, W> {
    pub fn new(source: &'a str, conf: CompilerConf, out: W) -> Self {
        Self {
            source,
            conf,
            out: VmWriter::new(out),
            class_name: SmolStr::default(),
            class_symbols: SymbolTable::new(),
            subroutine_symbols: SymbolTable::new(),
            labels: LabelAllocator::new(),
        }
    }

    pub fn compile(&mut self, class: &Class) -> JackResult<()> {
        self.emit_class(class)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    /// Look up a variable, subroutine scope first.
    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_symbols
            .find(name)
            .or_else(|| self.class_symbols.find(name))
    }

    /// Segment and index of a variable that must be declared.
    fn resolve(&self, ident: &Ident) -> JackResult<(Segment, u16)> {
        match self.lookup(&ident.name) {
            Some(symbol) => Ok((Segment::from(symbol.kind), symbol.index)),
            None => {
                let kind = CompileErrorKind::UndefinedSymbol(ident.name.clone());
                Err(self.error(&ident.span, kind))
            }
        }
    }

    #[cold]
    fn error(&self, span: &Span, kind: CompileErrorKind) -> JackError {
        CompileError::new(self.source, span, kind).into()
    }
}

/// Declare a variable, failing once its kind runs out of indices.
fn define_var(
    source: &str,
    table: &mut SymbolTable,
    ident: &Ident,
    ty: &Type,
    kind: SymbolKind,
) -> JackResult<()> {
    match table.define(ident.name.clone(), ty.clone(), kind) {
        Some(_) => Ok(()),
        None => {
            let kind = CompileErrorKind::TooManyVariables(kind);
            Err(CompileError::new(source, &ident.span, kind).into())
        }
    }
}

/// Declarations
impl<'a, W: io::Write> CodeGen<'a, W> {
    fn emit_class(&mut self, class: &Class) -> JackResult<()> {
        debug!("compiling class {}", class.name);

        self.class_name = class.name.name.clone();
        self.class_symbols.reset();

        for dec in &class.vars {
            let kind = match dec.kind {
                ClassVarKind::Static => SymbolKind::Static,
                ClassVarKind::Field => SymbolKind::Field,
            };
            for name in &dec.names {
                define_var(self.source, &mut self.class_symbols, name, &dec.ty, kind)?;
            }
        }

        for subroutine in &class.subroutines {
            self.emit_subroutine(subroutine)?;
        }

        Ok(())
    }

    fn emit_subroutine(&mut self, subroutine: &SubroutineDec) -> JackResult<()> {
        let name = format!("{}.{}", self.class_name, subroutine.name);
        debug!("compiling {:?} {name}", subroutine.kind);

        self.subroutine_symbols.reset();

        // The receiving object is the hidden first argument of a method.
        if subroutine.kind == SubroutineKind::Method {
            let ty = Type::Class(self.class_name.clone());
            self.subroutine_symbols.define("this", ty, SymbolKind::Argument);
        }
        for param in &subroutine.params.params {
            let (table, ident) = (&mut self.subroutine_symbols, &param.name);
            define_var(self.source, table, ident, &param.ty, SymbolKind::Argument)?;
        }
        for dec in &subroutine.body.vars {
            for local in &dec.names {
                let table = &mut self.subroutine_symbols;
                define_var(self.source, table, local, &dec.ty, SymbolKind::Local)?;
            }
        }

        let n_locals = self.subroutine_symbols.var_count(SymbolKind::Local);
        self.out.write_function(&name, n_locals)?;
        self.labels.reset_counts();

        match subroutine.kind {
            SubroutineKind::Constructor => {
                let n_fields = self.class_symbols.var_count(SymbolKind::Field);
                self.out.write_push(Segment::Constant, n_fields as u16)?;
                self.out.write_call("Memory.alloc", 1)?;
                self.out.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Method => {
                self.out.write_push(Segment::Argument, 0)?;
                self.out.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        self.emit_block(&subroutine.body.block)
    }
}

/// Statements
impl<'a, W: io::Write> CodeGen<'a, W> {
    fn emit_block(&mut self, block: &Block) -> JackResult<()> {
        for stmt in &block.stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    #[inline]
    fn emit_stmt(&mut self, stmt: &Stmt) -> JackResult<()> {
        match stmt {
            Stmt::Let(stmt) => self.emit_let(stmt),
            Stmt::If(stmt) => self.emit_if(stmt),
            Stmt::While(stmt) => self.emit_while(stmt),
            Stmt::Do(stmt) => self.emit_do(stmt),
            Stmt::Return(stmt) => self.emit_return(stmt),
        }
    }

    /// Statements of an `if` or `else` branch.
    fn emit_branch(&mut self, block: &Block) -> JackResult<()> {
        for stmt in &block.stmts {
            match stmt {
                Stmt::If(stmt) if self.conf.if_labels == IfLabels::Nested => {
                    self.labels.increment(LabelKind::If);
                    self.emit_if(stmt)?;
                    self.labels.decrement(LabelKind::If);
                }
                _ => self.emit_stmt(stmt)?,
            }
        }
        Ok(())
    }

    fn emit_let(&mut self, stmt: &LetStmt) -> JackResult<()> {
        let (segment, index) = self.resolve(&stmt.target)?;

        match &stmt.index {
            None => {
                self.emit_expr(&stmt.value)?;
                self.out.write_pop(segment, index)?;
            }
            Some(element) => {
                self.emit_expr(element)?;
                self.out.write_push(segment, index)?;
                self.out.write_arithmetic(Command::Add)?;

                // The value may itself read an array, which clobbers `that`.
                self.emit_expr(&stmt.value)?;
                self.out.write_pop(Segment::Temp, 0)?;
                self.out.write_pop(Segment::Pointer, 1)?;
                self.out.write_push(Segment::Temp, 0)?;
                self.out.write_pop(Segment::That, 0)?;
            }
        }

        Ok(())
    }

    fn emit_if(&mut self, stmt: &IfStmt) -> JackResult<()> {
        let n = match self.conf.if_labels {
            IfLabels::Unique => self.labels.next(LabelKind::If),
            IfLabels::Nested => self.labels.get(LabelKind::If),
        };

        self.emit_expr(&stmt.cond)?;
        self.out.write_if_goto(Label::IfTrue(n))?;
        self.out.write_goto(Label::IfFalse(n))?;
        self.out.write_label(Label::IfTrue(n))?;
        self.emit_branch(&stmt.then_block)?;

        match &stmt.else_block {
            Some(else_block) => {
                self.out.write_goto(Label::IfEnd(n))?;
                self.out.write_label(Label::IfFalse(n))?;
                self.emit_branch(else_block)?;
                self.out.write_label(Label::IfEnd(n))?;
            }
            None => {
                self.out.write_label(Label::IfFalse(n))?;
            }
        }

        Ok(())
    }

    fn emit_while(&mut self, stmt: &WhileStmt) -> JackResult<()> {
        let n = self.labels.next(LabelKind::While);

        self.out.write_label(Label::WhileExp(n))?;
        self.emit_expr(&stmt.cond)?;
        self.out.write_arithmetic(Command::Not)?;
        self.out.write_if_goto(Label::WhileEnd(n))?;
        self.emit_block(&stmt.body)?;
        self.out.write_goto(Label::WhileExp(n))?;
        self.out.write_label(Label::WhileEnd(n))?;

        Ok(())
    }

    fn emit_do(&mut self, stmt: &DoStmt) -> JackResult<()> {
        self.emit_call(&stmt.call)?;
        // Discard the return value.
        self.out.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    fn emit_return(&mut self, stmt: &ReturnStmt) -> JackResult<()> {
        match &stmt.value {
            Some(value) => self.emit_expr(value)?,
            None => self.out.write_push(Segment::Constant, 0)?,
        }
        self.out.write_return()?;
        Ok(())
    }
}

/// Expressions
impl<'a, W: io::Write> CodeGen<'a, W> {
    fn emit_expr(&mut self, expr: &Expr) -> JackResult<()> {
        match self.conf.operator_order {
            OperatorOrder::Deferred => self.emit_expr_deferred(expr),
            OperatorOrder::LeftToRight => self.emit_expr_left_to_right(expr),
        }
    }

    fn emit_expr_deferred(&mut self, expr: &Expr) -> JackResult<()> {
        let mut pending: Vec<PendingOp> = Vec::new();
        pending.extend(expr.head.unary.iter().copied().map(PendingOp::Unary));
        self.emit_term(&expr.head.term)?;

        for (op, operand) in &expr.tail {
            pending.push(PendingOp::Binary(*op));
            pending.extend(operand.unary.iter().copied().map(PendingOp::Unary));
            self.emit_term(&operand.term)?;
        }

        for op in pending.into_iter().rev() {
            match op {
                PendingOp::Unary(op) => self.emit_unary(op)?,
                PendingOp::Binary(op) => self.emit_binary(op)?,
            }
        }

        Ok(())
    }

    fn emit_expr_left_to_right(&mut self, expr: &Expr) -> JackResult<()> {
        self.emit_operand(&expr.head)?;
        for (op, operand) in &expr.tail {
            self.emit_operand(operand)?;
            self.emit_binary(*op)?;
        }
        Ok(())
    }

    /// Term followed by its unary operators, innermost first.
    fn emit_operand(&mut self, operand: &Operand) -> JackResult<()> {
        self.emit_term(&operand.term)?;
        for op in operand.unary.iter().rev() {
            self.emit_unary(*op)?;
        }
        Ok(())
    }

    fn emit_term(&mut self, term: &Term) -> JackResult<()> {
        match term {
            Term::IntConst(value) => self.out.write_push(Segment::Constant, *value)?,
            Term::StringConst(text, span) => self.emit_string(text, span)?,
            Term::Keyword(constant) => self.emit_keyword_const(*constant)?,
            Term::Var(ident) => {
                let (segment, index) = self.resolve(ident)?;
                self.out.write_push(segment, index)?;
            }
            Term::Index { array, index } => {
                let (segment, base) = self.resolve(array)?;
                self.emit_expr(index)?;
                self.out.write_push(segment, base)?;
                self.out.write_arithmetic(Command::Add)?;
                self.out.write_pop(Segment::Pointer, 1)?;
                self.out.write_push(Segment::That, 0)?;
            }
            Term::Call(call) => self.emit_call(call)?,
            Term::Paren(expr) => self.emit_expr(expr)?,
        }
        Ok(())
    }

    fn emit_keyword_const(&mut self, constant: KeywordConst) -> JackResult<()> {
        match constant {
            KeywordConst::True => {
                self.out.write_push(Segment::Constant, 0)?;
                self.out.write_arithmetic(Command::Not)?;
            }
            KeywordConst::False | KeywordConst::Null => {
                self.out.write_push(Segment::Constant, 0)?;
            }
            KeywordConst::This => {
                self.out.write_push(Segment::Pointer, 0)?;
            }
        }
        Ok(())
    }

    /// Build a string object one character at a time.
    fn emit_string(&mut self, text: &str, span: &Span) -> JackResult<()> {
        let codes = text
            .chars()
            .map(|c| match u16::try_from(u32::from(c)) {
                Ok(code) if code <= MAX_INT => Ok(code),
                _ => Err(self.error(span, CompileErrorKind::CharOutOfRange(c))),
            })
            .collect::<JackResult<Vec<u16>>>()?;

        let len = match u16::try_from(codes.len()) {
            Ok(len) if len <= MAX_INT => len,
            _ => return Err(self.error(span, CompileErrorKind::StringTooLong(codes.len()))),
        };

        self.out.write_push(Segment::Constant, len)?;
        self.out.write_call("String.new", 1)?;
        for code in codes {
            self.out.write_push(Segment::Constant, code)?;
            self.out.write_call("String.appendChar", 2)?;
        }

        Ok(())
    }

    fn emit_call(&mut self, call: &SubroutineCall) -> JackResult<()> {
        let (name, implicit) = match &call.receiver {
            // Method on the current object.
            None => {
                self.out.write_push(Segment::Pointer, 0)?;
                (format!("{}.{}", self.class_name, call.name), 1)
            }
            Some(receiver) => {
                let object = self
                    .lookup(&receiver.name)
                    .map(|symbol| (Segment::from(symbol.kind), symbol.index, symbol.ty.to_string()));

                match object {
                    // Method on the object held by a variable.
                    Some((segment, index, class_name)) => {
                        self.out.write_push(segment, index)?;
                        (format!("{class_name}.{}", call.name), 1)
                    }
                    // Anything else names a class.
                    None => (format!("{}.{}", receiver, call.name), 0),
                }
            }
        };

        for arg in &call.args.exprs {
            self.emit_expr(arg)?;
        }
        self.out.write_call(&name, call.args.len() + implicit)?;

        Ok(())
    }

    fn emit_binary(&mut self, op: BinaryOp) -> JackResult<()> {
        match op {
            BinaryOp::Add => self.out.write_arithmetic(Command::Add)?,
            BinaryOp::Sub => self.out.write_arithmetic(Command::Sub)?,
            BinaryOp::Mul => self.out.write_call("Math.multiply", 2)?,
            BinaryOp::Div => self.out.write_call("Math.divide", 2)?,
            BinaryOp::And => self.out.write_arithmetic(Command::And)?,
            BinaryOp::Or => self.out.write_arithmetic(Command::Or)?,
            BinaryOp::Lt => self.out.write_arithmetic(Command::Lt)?,
            BinaryOp::Gt => self.out.write_arithmetic(Command::Gt)?,
            BinaryOp::Eq => self.out.write_arithmetic(Command::Eq)?,
        }
        Ok(())
    }

    #[inline]
    fn emit_unary(&mut self, op: UnaryOp) -> JackResult<()> {
        let command = match op {
            UnaryOp::Neg => Command::Neg,
            UnaryOp::Not => Command::Not,
        };
        self.out.write_arithmetic(command)?;
        Ok(())
    }
}
