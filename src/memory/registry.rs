//! Named searches and the variables they resolve to
//!
//! A [`SearchRegistry`] keeps one [`SearchEngine`] per user-chosen name (for
//! example `"lives"` or `"score"`). Once a search narrows down to a single
//! address it can be bound to a [`Variable`], which is read directly from
//! later snapshots.

use crate::core::types::{
    Address, ComparisonOperator, DataType, SearchError, SearchResult, Value,
};
use crate::memory::search::{ScanOptions, SearchEngine};
use crate::memory::snapshot::MemorySnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use tracing::{debug, info};

/// An engine with explicit ownership.
///
/// `Managed` owns its engine and drops it with the handle. `Unmanaged` only
/// views an engine owned by a registry.
#[derive(Debug)]
pub enum SearchHandle<'a> {
    Managed(Box<SearchEngine>),
    Unmanaged(&'a SearchEngine),
}

impl SearchHandle<'static> {
    /// Creates an owning handle over a fresh engine
    pub fn managed<I>(types: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = DataType>,
    {
        Ok(SearchHandle::Managed(Box::new(SearchEngine::new(types)?)))
    }
}

impl SearchHandle<'_> {
    pub fn is_managed(&self) -> bool {
        matches!(self, SearchHandle::Managed(_))
    }
}

impl Deref for SearchHandle<'_> {
    type Target = SearchEngine;

    fn deref(&self) -> &SearchEngine {
        match self {
            SearchHandle::Managed(engine) => engine.as_ref(),
            SearchHandle::Unmanaged(engine) => *engine,
        }
    }
}

/// A named location in memory with a known type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub address: Address,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Variable {
    pub fn new(address: Address, data_type: DataType) -> Self {
        Variable { address, data_type }
    }

    /// Reads the variable's current value
    pub fn read<S: MemorySnapshot + ?Sized>(&self, snapshot: &S) -> SearchResult<Value> {
        snapshot.read_value(self.address, self.data_type)
    }

    /// Encodes `value` as this variable's type and writes it into `memory`
    pub fn write(&self, memory: &mut [u8], value: Value) -> SearchResult<()> {
        let bytes = self.data_type.encode(self.data_type.coerce(value))?;
        let len = memory.len();
        let slot = self
            .address
            .offset(bytes.len())
            .and_then(|end| memory.get_mut(self.address.as_usize()..end.as_usize()))
            .ok_or_else(|| SearchError::out_of_range(self.address, bytes.len(), len))?;
        slot.copy_from_slice(&bytes);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VariableFile {
    #[serde(default)]
    variables: BTreeMap<String, Variable>,
}

/// Owner of every named search and variable for one game
#[derive(Debug)]
pub struct SearchRegistry {
    default_types: Vec<DataType>,
    options: ScanOptions,
    searches: HashMap<String, SearchEngine>,
    variables: BTreeMap<String, Variable>,
}

impl SearchRegistry {
    /// Creates a registry whose implicit searches test `default_types`
    pub fn new<I>(default_types: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = DataType>,
    {
        // Validates the list the same way an engine would
        let probe = SearchEngine::new(default_types)?;
        Ok(SearchRegistry {
            default_types: probe.types().to_vec(),
            options: ScanOptions::default(),
            searches: HashMap::new(),
            variables: BTreeMap::new(),
        })
    }

    /// Sets the scan options given to engines created from now on
    pub fn with_options(mut self, options: ScanOptions) -> SearchResult<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn default_types(&self) -> &[DataType] {
        &self.default_types
    }

    /// Creates (or replaces) the search `name` testing `types`
    pub fn create_search<I>(&mut self, name: &str, types: I) -> SearchResult<&mut SearchEngine>
    where
        I: IntoIterator<Item = DataType>,
    {
        let engine = SearchEngine::new(types)?.with_options(self.options.clone())?;
        debug!(name, types = engine.types().len(), "Created search");
        self.searches.insert(name.to_string(), engine);
        self.searches
            .get_mut(name)
            .ok_or_else(|| SearchError::SearchNotFound(name.to_string()))
    }

    /// Runs the initial search `name`, creating it with the default types on
    /// first use
    pub fn search<S, V>(&mut self, name: &str, snapshot: &S, value: V) -> SearchResult<()>
    where
        S: MemorySnapshot + ?Sized,
        V: Into<Value>,
    {
        if !self.searches.contains_key(name) {
            let types = self.default_types.clone();
            self.create_search(name, types)?;
        }
        self.engine_mut(name)?.search(snapshot, value)
    }

    /// Narrows the search `name`
    pub fn delta_search<S>(
        &mut self,
        name: &str,
        snapshot: &S,
        op: ComparisonOperator,
        reference: Option<Value>,
    ) -> SearchResult<()>
    where
        S: MemorySnapshot + ?Sized,
    {
        self.engine_mut(name)?.delta_search(snapshot, op, reference)
    }

    /// Narrows the search `name` with a textual operator such as `">="`.
    ///
    /// The token is parsed before the search is looked up or modified.
    pub fn delta_search_str<S>(
        &mut self,
        name: &str,
        snapshot: &S,
        op: &str,
        reference: Option<Value>,
    ) -> SearchResult<()>
    where
        S: MemorySnapshot + ?Sized,
    {
        let op: ComparisonOperator = op.parse()?;
        self.delta_search(name, snapshot, op, reference)
    }

    /// Returns a non-owning view of the search `name`
    pub fn get_search(&self, name: &str) -> Option<SearchHandle<'_>> {
        self.searches.get(name).map(SearchHandle::Unmanaged)
    }

    /// Removes the search `name`, returning its engine if it existed
    pub fn remove_search(&mut self, name: &str) -> Option<SearchEngine> {
        self.searches.remove(name)
    }

    /// Names of every search, sorted
    pub fn list_searches(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.searches.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn engine_mut(&mut self, name: &str) -> SearchResult<&mut SearchEngine> {
        self.searches
            .get_mut(name)
            .ok_or_else(|| SearchError::SearchNotFound(name.to_string()))
    }

    pub fn set_variable(&mut self, name: &str, variable: Variable) {
        self.variables.insert(name.to_string(), variable);
    }

    pub fn get_variable(&self, name: &str) -> SearchResult<Variable> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| SearchError::VariableNotFound(name.to_string()))
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    /// Every variable, sorted by name
    pub fn list_variables(&self) -> Vec<(&str, Variable)> {
        self.variables
            .iter()
            .map(|(name, variable)| (name.as_str(), *variable))
            .collect()
    }

    /// Reads the variable `name` from `snapshot`
    pub fn lookup_value<S>(&self, name: &str, snapshot: &S) -> SearchResult<Value>
    where
        S: MemorySnapshot + ?Sized,
    {
        self.get_variable(name)?.read(snapshot)
    }

    /// Writes `value` to the variable `name` in the emulator's memory.
    ///
    /// Values outside the variable's type fail with `TypeMismatch` and leave
    /// memory untouched.
    pub fn set_value<V>(&self, name: &str, memory: &mut [u8], value: V) -> SearchResult<()>
    where
        V: Into<Value>,
    {
        let variable = self.get_variable(name)?;
        let value = value.into();
        variable.write(memory, value)?;
        debug!(variable = name, address = %variable.address, %value, "Wrote variable");
        Ok(())
    }

    /// Reads every variable from `snapshot`
    pub fn lookup_all<S>(&self, snapshot: &S) -> SearchResult<BTreeMap<String, Value>>
    where
        S: MemorySnapshot + ?Sized,
    {
        self.variables
            .iter()
            .map(|(name, variable)| Ok((name.clone(), variable.read(snapshot)?)))
            .collect()
    }

    /// Binds the unique result of `search_name` to `variable_name`.
    ///
    /// Fails unless the search has exactly one candidate left.
    pub fn bind_unique(&mut self, search_name: &str, variable_name: &str) -> SearchResult<Variable> {
        let result = self
            .searches
            .get(search_name)
            .ok_or_else(|| SearchError::SearchNotFound(search_name.to_string()))?
            .unique_result()?;

        let variable = Variable::new(result.address, result.data_type);
        info!(
            search = search_name,
            variable = variable_name,
            address = %variable.address,
            data_type = %variable.data_type,
            "Bound search result to variable"
        );
        self.set_variable(variable_name, variable);
        Ok(variable)
    }

    /// Serializes the variables in the game data file layout
    pub fn variables_to_json(&self) -> SearchResult<String> {
        let file = VariableFile {
            variables: self.variables.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Replaces the variables with those from a game data file.
    ///
    /// Nothing is replaced if the document fails to parse.
    pub fn variables_from_json(&mut self, json: &str) -> SearchResult<usize> {
        let file: VariableFile = serde_json::from_str(json)?;
        self.variables = file.variables;
        Ok(self.variables.len())
    }
}
