
use std::slice::Iter;
use crate::runtime::data_structures::value::Value;



/// The data stack shared by every operation in the interpreter.  Values are only pushed and popped
/// at the top, but the top few values can be examined without popping them.
#[derive(Default, Clone, Debug)]
pub struct ValueStack
{
    items: Vec<Value>
}


impl ValueStack
{
    pub fn new() -> ValueStack
    {
        ValueStack::default()
    }

    /// Push a value on top of the stack.
    pub fn push(&mut self, value: Value)
    {
        self.items.push(value);
    }

    /// Remove the top value, None if the stack is empty.
    pub fn pop(&mut self) -> Option<Value>
    {
        self.items.pop()
    }

    /// Look at the top value without removing it.
    pub fn peek(&self) -> Option<&Value>
    {
        self.items.last()
    }

    /// Look at the top value mutably without removing it.
    pub fn peek_mut(&mut self) -> Option<&mut Value>
    {
        self.items.last_mut()
    }

    /// The top two values as `(second, top)`, or None if there are fewer than two.
    pub fn top_two(&self) -> Option<(&Value, &Value)>
    {
        match self.top_n(2)
        {
            Some([ second, top ]) => Some((second, top)),
            _                     => None
        }
    }

    /// The top `count` values, deepest first, without popping them.
    pub fn top_n(&self, count: usize) -> Option<&[Value]>
    {
        if count > self.items.len()
        {
            return None;
        }

        Some(&self.items[self.items.len() - count..])
    }

    /// Pop the top `count` values at once, returned deepest first.  Nothing is popped if there
    /// aren't enough values.
    pub fn pop_n(&mut self, count: usize) -> Option<Vec<Value>>
    {
        if count > self.items.len()
        {
            return None;
        }

        let start = self.items.len() - count;

        Some(self.items.split_off(start))
    }

    pub fn len(&self) -> usize
    {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.items.is_empty()
    }

    /// Iterate from the bottom of the stack to the top.
    pub fn iter(&self) -> Iter<'_, Value>
    {
        self.items.iter()
    }
}
