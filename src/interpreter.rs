//! Tree‑walking evaluator.
//!
//! Statements run through [`Interpreter::execute`], which reports how control
//! left the statement ([`Flow`]); expressions through
//! [`Interpreter::evaluate`]. Errors travel as [`LoxError::Runtime`] and are
//! never used for `return`.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::environment::{Environment, SharedEnv};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::{Callable, LoxClass, LoxFunction, LoxInstance, NativeFn, NativeFunction, Value};

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,

    /// A `return` is unwinding to the nearest call boundary.
    Return(Value),
}

pub struct Interpreter {
    globals: SharedEnv,
    environment: SharedEnv,

    /// Resolver output: expression id → scope distance. Absent ⇒ global.
    locals: HashMap<ExprId, usize>,

    /// Sink for `print`.
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter printing to stdout, with the native functions defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_shared();

        let mut interpreter = Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        };

        debug!("Defining native function 'clock'");
        interpreter.define_native("clock", 0, clock);

        interpreter
    }

    /// Make a host function available as a global.
    pub fn define_native(&mut self, name: &str, arity: usize, func: NativeFn) {
        let native = NativeFunction {
            name: name.to_string(),
            arity,
            func,
        };

        self.globals
            .borrow_mut()
            .define(name, Value::Callable(Callable::Native(Rc::new(native))));
    }

    /// Called by the resolver with the distances of one successful pass.
    ///
    /// Entries are never removed: a closure created by an earlier run may
    /// still reach any node resolved so far.
    pub fn note_locals(&mut self, locals: HashMap<ExprId, usize>) {
        debug!("Noting {} resolved local(s)", locals.len());
        self.locals.extend(locals);
    }

    /// Number of resolved local references held.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Interprets a list of statements (a "program").
    ///
    /// The first runtime error stops the run; globals defined before it stay.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Err(e) = self.execute(stmt) {
                debug!("Runtime error, abandoning run: {}", e);
                self.environment = Rc::clone(&self.globals);
                return Err(e);
            }
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, scope.into_shared())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                let previous = std::mem::replace(&mut self.environment, scope.into_shared());

                let result = self.run_for(
                    initializer.as_deref(),
                    condition.as_ref(),
                    increment.as_ref(),
                    body,
                );

                self.environment = previous;
                result
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function =
                    LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment), false);

                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
                Ok(Flow::Normal)
            }

            Stmt::Class { name, methods } => {
                self.define_class(name, methods)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// `for` runs as initializer + while loop inside its own scope.
    fn run_for(
        &mut self,
        initializer: Option<&Stmt>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &Stmt,
    ) -> Result<Flow> {
        if let Some(init) = initializer {
            self.execute(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            if let Flow::Return(value) = self.execute(body)? {
                return Ok(Flow::Return(value));
            }

            if let Some(increment) = increment {
                self.evaluate(increment)?;
            }
        }

        Ok(Flow::Normal)
    }

    /// Declare the name first so methods can refer to their own class.
    fn define_class(&mut self, name: &Token, methods: &[Rc<FunctionDecl>]) -> Result<()> {
        debug!("Defining class '{}'", name.lexeme);

        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let table = methods
            .iter()
            .map(|method| {
                let function = LoxFunction::new(
                    Rc::clone(method),
                    Rc::clone(&self.environment),
                    method.name.lexeme == "init",
                );
                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme.clone(), table);

        self.environment
            .borrow_mut()
            .assign(name, Value::Callable(Callable::Class(Rc::new(class))))
    }

    /// Runs `statements` in `scope`, restoring the current scope on every
    /// exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], scope: SharedEnv) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, scope);

        let mut result = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match operator.kind {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
                    },
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }

            Expr::Logical {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left)?.is_truthy();

                let decided = match operator.kind {
                    TokenType::OR if left => true,
                    TokenType::AND if !left => false,
                    _ => self.evaluate(right)?.is_truthy(),
                };

                Ok(Value::Bool(decided))
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                debug!("Assigned {} to '{}'", value, name.lexeme);
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.invoke_callable(&callee, paren, args)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Callable(Callable::Instance(instance)) => instance.get(name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Callable(Callable::Instance(instance)) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.set(name, value.clone());
                Ok(value)
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Checks the callee and arity, then calls it.
    fn invoke_callable(
        &mut self,
        callee: &Value,
        paren: &Token,
        args: Vec<Value>,
    ) -> Result<Value> {
        match callee {
            Value::Callable(Callable::Native(native)) => {
                check_arity(native.arity, &args, paren)?;
                debug!("Calling native function '{}'", native.name);

                (native.func)(self, &args).map_err(|message| LoxError::runtime(paren, message))
            }

            Value::Callable(Callable::Function(function)) => {
                check_arity(function.arity(), &args, paren)?;
                self.call_function(function, args)
            }

            Value::Callable(Callable::Class(class)) => {
                check_arity(class.arity(), &args, paren)?;
                debug!("Constructing instance of '{}'", class.name);

                let instance = Rc::new(LoxInstance::new(Rc::clone(class)));

                if let Some(init) = class.find_method("init") {
                    // Whatever init returns, the call yields the instance.
                    self.call_function(&init.bind(Rc::clone(&instance)), args)?;
                }

                Ok(Value::Callable(Callable::Instance(instance)))
            }

            _ => Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn call_function(&mut self, function: &LoxFunction, args: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function '{}'", function.name());

        let mut scope = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, arg) in function.declaration.params.iter().zip(args) {
            scope.define(&param.lexeme, arg);
        }

        let flow = self.execute_block(&function.declaration.body, scope.into_shared())?;

        if function.is_initializer {
            let this = Token::new(TokenType::THIS, "this", function.declaration.name.line);
            return Environment::get_at(&function.closure, 0, &this);
        }

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────────────

fn check_arity(arity: usize, args: &[Value], paren: &Token) -> Result<()> {
    if args.len() != arity {
        return Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", arity, args.len()),
        ));
    }

    Ok(())
}

fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    let numbers = |left: Value, right: Value| match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    };

    match operator.kind {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            _ => Err(LoxError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },

        TokenType::MINUS => numbers(left, right).map(|(a, b)| Value::Number(a - b)),

        TokenType::STAR => numbers(left, right).map(|(a, b)| Value::Number(a * b)),

        TokenType::SLASH => {
            let (a, b) = numbers(left, right)?;
            if b == 0.0 {
                return Err(LoxError::runtime(operator, "Division by zero."));
            }
            Ok(Value::Number(a / b))
        }

        TokenType::GREATER => numbers(left, right).map(|(a, b)| Value::Bool(a > b)),
        TokenType::GREATER_EQUAL => numbers(left, right).map(|(a, b)| Value::Bool(a >= b)),
        TokenType::LESS => numbers(left, right).map(|(a, b)| Value::Bool(a < b)),
        TokenType::LESS_EQUAL => numbers(left, right).map(|(a, b)| Value::Bool(a <= b)),

        TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
        TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}

/// Seconds since the Unix epoch.
fn clock(_: &mut Interpreter, _: &[Value]) -> std::result::Result<Value, String> {
    let now = Utc::now();
    let seconds = now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1e6;

    debug!("Native function 'clock' returned: {}", seconds);

    Ok(Value::Number(seconds))
}
