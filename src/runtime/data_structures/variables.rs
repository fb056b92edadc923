
use std::{ collections::HashMap,
           fmt::{ self,
                  Debug,
                  Formatter } };
use crate::{ lang::source_buffer::SourceLocation,
             runtime::data_structures::{ contextual_data::ContextualData,
                                         value::Value } };



/// Is the binding mutable or not?
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BindingKind
{
    /// Can be written to with `!` and friends.
    Variable,

    /// Any attempt at writing is a runtime error.
    Constant
}


/// A named storage cell holding one current value.
#[derive(Clone, Debug)]
pub struct Binding
{
    /// The name the binding was declared with.
    pub name: String,

    /// Variable or constant.
    pub kind: BindingKind,

    /// The current value of the binding.
    pub value: Value,

    /// Where the binding was declared.
    pub location: SourceLocation
}


impl Binding
{
    pub fn new(name: &str, kind: BindingKind, value: Value, location: SourceLocation) -> Binding
    {
        Binding { name: name.to_string(), kind, value, location }
    }
}



/// A stable handle to a binding in the arena.  The generation is checked on every access so that a
/// handle to a released binding is detected instead of silently reading a newer occupant of the
/// slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableHandle
{
    index: usize,
    generation: u32
}


impl Debug for VariableHandle
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "var#{}.{}", self.index, self.generation)
    }
}



/// Internal use only, a slot in the arena.
struct Slot
{
    generation: u32,
    binding: Option<Binding>
}


/// Owner of every binding known to the interpreter, global and local alike.
#[derive(Default)]
pub struct VariableArena
{
    slots: Vec<Slot>,
    free: Vec<usize>
}


impl VariableArena
{
    pub fn new() -> VariableArena
    {
        VariableArena::default()
    }

    /// Store a new binding, reusing a released slot if one is available.
    pub fn insert(&mut self, binding: Binding) -> VariableHandle
    {
        if let Some(index) = self.free.pop()
        {
            let slot = &mut self.slots[index];

            slot.binding = Some(binding);
            VariableHandle { index, generation: slot.generation }
        }
        else
        {
            self.slots.push(Slot { generation: 0, binding: Some(binding) });
            VariableHandle { index: self.slots.len() - 1, generation: 0 }
        }
    }

    /// Release a binding.  Every handle to it becomes stale.
    pub fn remove(&mut self, handle: VariableHandle) -> Option<Binding>
    {
        let slot = self.slots.get_mut(handle.index)?;

        if slot.generation != handle.generation
        {
            return None;
        }

        let binding = slot.binding.take()?;

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);

        Some(binding)
    }

    /// Get the binding, or None if the handle outlived it.
    pub fn get(&self, handle: VariableHandle) -> Option<&Binding>
    {
        self.slots.get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.binding.as_ref())
    }

    /// Get the binding mutably, or None if the handle outlived it.
    pub fn get_mut(&mut self, handle: VariableHandle) -> Option<&mut Binding>
    {
        self.slots.get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.binding.as_mut())
    }

    /// How many bindings are currently alive.
    pub fn len(&self) -> usize
    {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }
}



/// A single scope's name to binding mapping.
pub type VariableTable = HashMap<String, VariableHandle>;


/// The variable scopes of the interpreter.  The first table is the global one and lives as long as
/// the interpreter.  Every word invocation marks a new local table and releases it on return,
/// freeing its bindings in the arena.
///
/// Only the global table and the innermost local table are visible, a word can't see the locals
/// of its caller.
pub struct Variables
{
    arena: VariableArena,
    tables: Vec<VariableTable>
}


impl Default for Variables
{
    fn default() -> Self
    {
        Self::new()
    }
}


impl ContextualData for Variables
{
    fn mark_context(&mut self)
    {
        self.tables.push(VariableTable::new());
    }

    /// Release the innermost local table.  This will panic if asked to release the global table.
    fn release_context(&mut self)
    {
        if self.tables.len() == 1
        {
            panic!("Releasing the global variable table!");
        }

        if let Some(table) = self.tables.pop()
        {
            for handle in table.values()
            {
                let _ = self.arena.remove(*handle);
            }
        }
    }
}


impl Variables
{
    /// Create the variable scopes with an empty global table.
    pub fn new() -> Variables
    {
        Variables { arena: VariableArena::new(), tables: vec![ VariableTable::new() ] }
    }

    /// Is a local table currently active?
    pub fn in_local_scope(&self) -> bool
    {
        self.tables.len() > 1
    }

    /// Bind a name in the current scope, the innermost local table or the global one.  A name
    /// already declared in that same scope has its binding replaced in place, so existing
    /// references see the new value.
    pub fn declare(&mut self, binding: Binding) -> VariableHandle
    {
        self.declare_in(self.tables.len() - 1, binding)
    }

    /// Declare a binding directly in the global table, regardless of the current scope.
    pub fn declare_global(&mut self, binding: Binding) -> VariableHandle
    {
        self.declare_in(0, binding)
    }

    fn declare_in(&mut self, index: usize, binding: Binding) -> VariableHandle
    {
        if let Some(handle) = self.tables[index].get(&binding.name).copied()
            && let Some(existing) = self.arena.get_mut(handle)
        {
            *existing = binding;
            return handle;
        }

        let name = binding.name.clone();
        let handle = self.arena.insert(binding);

        self.tables[index].insert(name, handle);
        handle
    }

    /// Find a name in the innermost local table first, then in the global table.
    pub fn find(&self, name: &str) -> Option<VariableHandle>
    {
        let local = if self.in_local_scope()
            {
                self.tables.last().and_then(|table| table.get(name))
            }
            else
            {
                None
            };

        local.or_else(|| self.tables[0].get(name)).copied()
    }

    pub fn get(&self, handle: VariableHandle) -> Option<&Binding>
    {
        self.arena.get(handle)
    }

    pub fn get_mut(&mut self, handle: VariableHandle) -> Option<&mut Binding>
    {
        self.arena.get_mut(handle)
    }

    /// The number of live bindings across all scopes.
    pub fn len(&self) -> usize
    {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.arena.is_empty()
    }
}
