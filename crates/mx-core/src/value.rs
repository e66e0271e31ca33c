//! Dynamic values passed to and returned from behavior methods.

use std::fmt;
use std::sync::Arc;

use crate::{CallError, CallResult, Instance, PrivateContext};

/// Public method: runs with an [`Instance`] as its receiver.
pub type Method = Arc<dyn Fn(&Instance, &[Value]) -> CallResult<Value> + Send + Sync>;

/// Private body: runs with a [`PrivateContext`] as its execution scope.
pub type Body = Arc<dyn Fn(&PrivateContext, &[Value]) -> CallResult<Value> + Send + Sync>;

/// Wrap a closure as a [`Method`].
pub fn method<F>(f: F) -> Method
where
    F: Fn(&Instance, &[Value]) -> CallResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`Body`].
pub fn body<F>(f: F) -> Body
where
    F: Fn(&PrivateContext, &[Value]) -> CallResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

// ── Function ──────────────────────────────────────────────────────────────────

/// A callable already bound to its receiver.
///
/// The `around` policy hands the pre-existing implementation to the incoming
/// one as a `Function` in argument position 0.
#[derive(Clone)]
pub struct Function(Arc<dyn Fn(&[Value]) -> CallResult<Value> + Send + Sync>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Bind `method` to `receiver`.
    pub fn bind(method: Method, receiver: Instance) -> Self {
        Self::new(move |args| method(&receiver, args))
    }

    #[inline]
    pub fn call(&self, args: &[Value]) -> CallResult<Value> {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(..)")
    }
}

// ── Value ─────────────────────────────────────────────────────────────────────

/// Argument and return type of every method.
///
/// Scalars compare by value; instances, contexts and functions compare by
/// identity.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(Vec<Value>),
    Instance(Instance),
    Context(PrivateContext),
    Function(Function),
}

impl Value {
    /// Human-readable kind, used in argument errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit        => "unit",
            Value::Bool(_)     => "bool",
            Value::Int(_)      => "int",
            Value::Float(_)    => "float",
            Value::Str(_)      => "string",
            Value::List(_)     => "list",
            Value::Instance(_) => "instance",
            Value::Context(_)  => "context",
            Value::Function(_) => "function",
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&PrivateContext> {
        match self {
            Value::Context(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

/// Fetch argument `index` of `method`, converting it with `convert`.
///
/// ```rust
/// use mx_core::{arg, Value};
///
/// let args = [Value::from("x")];
/// let title = arg(&args, 0, "addSong", "string", Value::as_str).unwrap();
/// assert_eq!(title, "x");
/// ```
pub fn arg<'a, T>(
    args:     &'a [Value],
    index:    usize,
    method:   &str,
    expected: &'static str,
    convert:  impl FnOnce(&'a Value) -> Option<T>,
) -> CallResult<T> {
    args.get(index).and_then(convert).ok_or_else(|| CallError::BadArgument {
        method: method.to_string(),
        index,
        expected,
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit)               => true,
            (Value::Bool(a), Value::Bool(b))         => a == b,
            (Value::Int(a), Value::Int(b))           => a == b,
            (Value::Float(a), Value::Float(b))       => a == b,
            (Value::Str(a), Value::Str(b))           => a == b,
            (Value::List(a), Value::List(b))         => a == b,
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            (Value::Context(a), Value::Context(b))   => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit        => f.write_str("()"),
            Value::Bool(b)     => write!(f, "{b}"),
            Value::Int(n)      => write!(f, "{n}"),
            Value::Float(x)    => write!(f, "{x}"),
            Value::Str(s)      => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Instance(i) => write!(f, "{}", i.id()),
            Value::Context(c)  => write!(f, "<context of {}>", c.behavior()),
            Value::Function(_) => f.write_str("<function>"),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Value::Instance(i)
    }
}

impl From<PrivateContext> for Value {
    fn from(c: PrivateContext) -> Self {
        Value::Context(c)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}
