
use std::fmt::{ self,
                Display,
                Formatter };
use crate::runtime::{ data_structures::variables::VariableHandle,
                      error::{ self,
                               script_error },
                      interpreter::Interpreter };



/// A single element of a composite value.  Composites only hold plain data, never other composites
/// or variable references.
#[derive(Clone, PartialEq, Debug)]
pub enum Element
{
    /// A numeric element.
    Number(f64),

    /// A text element.
    Text(String)
}


impl Display for Element
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            Element::Number(value) => write!(f, "{}", value),
            Element::Text(value)   => write!(f, "{}", value)
        }
    }
}


/// The ordered list of elements held by a composite value.
pub type Composite = Vec<Element>;



/// Core value enumeration used by the interpreter.  This is the unit held by the data stack, by
/// variable bindings, and by literal tokens.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum Value
{
    /// The value represents nothing and no data is associated.
    #[default]
    None,

    /// All numbers in the language are floating point.
    Number(f64),

    /// A string value, represented by a Rust string.
    Text(String),

    /// An ordered sequence of numbers and text.
    Composite(Composite),

    /// A non-owning reference to a live variable or constant binding.
    Reference(VariableHandle)
}


/// Convert an arbitrary data type to a Value.
pub trait ToValue
{
    /// Implement to handle the actual conversion.
    fn to_value(&self) -> Value;
}


impl ToValue for f64
{
    fn to_value(&self) -> Value
    {
        Value::Number(*self)
    }
}


/// The stack depth and similar counts are pushed as numbers.
impl ToValue for usize
{
    fn to_value(&self) -> Value
    {
        Value::Number(*self as f64)
    }
}


impl ToValue for String
{
    fn to_value(&self) -> Value
    {
        Value::Text(self.clone())
    }
}


impl ToValue for &str
{
    fn to_value(&self) -> Value
    {
        Value::Text(self.to_string())
    }
}


impl ToValue for Element
{
    fn to_value(&self) -> Value
    {
        match self
        {
            Element::Number(value) => Value::Number(*value),
            Element::Text(value)   => Value::Text(value.clone())
        }
    }
}


/// Booleans follow the language's convention, -1 for true and 0 for false.
impl ToValue for bool
{
    fn to_value(&self) -> Value
    {
        Value::Number(if *self { -1.0 } else { 0.0 })
    }
}


/// Support converting directly from the data types that implement ToValue.
macro_rules! value_from
{
    ($( $data_type:ty ),*) =>
    {
        $(
            impl From<$data_type> for Value
            {
                fn from(original: $data_type) -> Value
                {
                    original.to_value()
                }
            }
        )*
    };
}


value_from!(f64, usize, String, &str, bool, Element);


/// Convert a list of strings, such as the process arguments, into a composite value.
impl From<&[String]> for Value
{
    fn from(list: &[String]) -> Value
    {
        Value::Composite(list.iter().map(|item| Element::Text(item.clone())).collect())
    }
}


/// Print the value the way the `.` word shows it.  Only numbers and text have a printed form.
impl Display for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            Value::Number(value) => write!(f, "{}", value),
            Value::Text(value)   => write!(f, "{}", value),

            Value::None | Value::Composite(_) | Value::Reference(_) => Ok(())
        }
    }
}


/// Define accessors that either borrow the held data or raise a runtime error naming the expected
/// type.
macro_rules! value_conversion
{
    ($data_type:ty , $variant:ident , $as_ident:ident , $description:literal) =>
    {
        impl Value
        {
            #[doc = concat!("Get the ", $description, " held by the value or error out.")]
            pub fn $as_ident(&self, interpreter: &dyn Interpreter) -> error::Result<&$data_type>
            {
                match self
                {
                    Value::$variant(value) => Ok(value),
                    _ => script_error(interpreter,
                                      format!("Expected {}, found {}.",
                                              $description,
                                              self.type_name()))
                }
            }
        }
    };
}


value_conversion!(f64,            Number,    as_number,    "a number");
value_conversion!(VariableHandle, Reference, as_reference, "a variable reference");


impl Value
{
    /// A short name of the value's type for error messages.
    pub fn type_name(&self) -> &'static str
    {
        match self
        {
            Value::None         => "nothing",
            Value::Number(_)    => "a number",
            Value::Text(_)      => "text",
            Value::Composite(_) => "a composite",
            Value::Reference(_) => "a variable reference"
        }
    }

    /// Get the number held by the value, if it is one.
    pub fn number(&self) -> Option<f64>
    {
        match self
        {
            Value::Number(value) => Some(*value),
            _                    => None
        }
    }

    /// The language's only notion of truth, a value is truthy if it is numeric and non-zero.
    pub fn is_truthy(&self) -> bool
    {
        matches!(self, Value::Number(value) if *value != 0.0)
    }

    /// Convert the value into a composite element, only numbers and text can be held.
    pub fn to_element(&self) -> Option<Element>
    {
        match self
        {
            Value::Number(value) => Some(Element::Number(*value)),
            Value::Text(value)   => Some(Element::Text(value.clone())),
            _                    => None
        }
    }
}
