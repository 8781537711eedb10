//! The model registry.
//!
//! A registry is an ordinary value: build it once at start-up (usually with
//! [`ModelRegistry::with_builtin_models`]), then share it behind an `Arc`.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use super::definition::{synthetic_primary_key, timestamp_field, ModelDefinition};
use super::field::{FieldDefinition, FieldType};
use crate::error::{SyncError, SyncResult};
use crate::sql::ident::{validate_default_expr, validate_identifier};

/// Name of the injected primary key.
pub const SYNTHETIC_KEY: &str = "id";

/// Registered model definitions, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDefinition>,
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the console's built-in models.
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        for model in builtin_models() {
            // Built-ins are static and valid.
            if let Err(e) = registry.define_model(model) {
                tracing::error!(error = %e, "built-in model rejected");
            }
        }
        registry
    }

    /// Validate, normalize and register a model.
    ///
    /// A model without a primary key gets `id uuid PRIMARY KEY DEFAULT
    /// gen_random_uuid()` prepended. With `timestamps`, `createdAt` and
    /// `updatedAt` are appended (or replaced in place when already declared).
    /// Re-registering a name replaces the old definition but keeps its
    /// position in [`ModelRegistry::all_models`].
    pub fn define_model(&mut self, mut model: ModelDefinition) -> SyncResult<ModelDefinition> {
        validate_identifier(&model.name)?;

        let mut seen = HashSet::new();
        for field in &model.fields {
            validate_identifier(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(SyncError::InvalidModel(format!(
                    "model \"{}\" declares field \"{}\" twice",
                    model.name, field.name
                )));
            }
            if let Some(expr) = &field.definition.default_value {
                validate_default_expr(expr)?;
            }
            if let Some(reference) = &field.definition.references {
                validate_identifier(&reference.model)?;
                validate_identifier(&reference.field)?;
            }
        }

        let keys = model.fields.iter().filter(|f| f.definition.primary_key).count();
        if keys > 1 {
            return Err(SyncError::InvalidModel(format!(
                "model \"{}\" declares {keys} primary keys",
                model.name
            )));
        }

        for field in &mut model.fields {
            if field.definition.primary_key {
                field.definition.nullable = false;
            }
        }

        if keys == 0 {
            if model.get_field(SYNTHETIC_KEY).is_some() {
                return Err(SyncError::InvalidModel(format!(
                    "model \"{}\" has a non-key \"{SYNTHETIC_KEY}\" field and no primary key",
                    model.name
                )));
            }
            model.fields.insert(
                0,
                super::definition::Field {
                    name: SYNTHETIC_KEY.to_string(),
                    definition: synthetic_primary_key(),
                },
            );
        }

        if model.timestamps {
            model.upsert_field("createdAt", timestamp_field());
            model.upsert_field("updatedAt", timestamp_field());
        }

        match self.index.get(&model.name) {
            Some(&pos) => self.models[pos] = model.clone(),
            None => {
                self.index.insert(model.name.clone(), self.models.len());
                self.models.push(model.clone());
            }
        }

        tracing::debug!(model = %model.name, fields = model.fields.len(), "model registered");
        Ok(model)
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelDefinition> {
        self.index.get(name).map(|&pos| &self.models[pos])
    }

    /// All models in registration order.
    pub fn all_models(&self) -> &[ModelDefinition] {
        &self.models
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Reference graph over registered models.
    ///
    /// Node weights are registration positions, so `NodeIndex::index()`
    /// equals the node weight. Edges run from the referenced model to the
    /// referrer. References to unregistered models and self references add
    /// no edge.
    fn reference_graph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::with_capacity(self.models.len(), self.models.len());
        let nodes: Vec<NodeIndex> = (0..self.models.len()).map(|i| graph.add_node(i)).collect();
        for (pos, model) in self.models.iter().enumerate() {
            for dep in model.referenced_models() {
                match self.index.get(dep) {
                    Some(&target) if target != pos => {
                        graph.add_edge(nodes[target], nodes[pos], ());
                    }
                    _ => {}
                }
            }
        }
        graph
    }

    /// Models ordered so that referenced models come before their referrers.
    ///
    /// Registration order is kept wherever references allow it. References to
    /// unregistered models are ignored. Models on a reference cycle are
    /// emitted together, in registration order.
    pub fn dependency_order(&self) -> Vec<&ModelDefinition> {
        let graph = self.reference_graph();
        if let Err(cycle) = toposort(&graph, None) {
            tracing::warn!(
                model = %self.models[graph[cycle.node_id()]].name,
                "reference cycle between models"
            );
        }

        // Strongly connected components are single models unless cyclic.
        let mut components = tarjan_scc(&graph);
        let mut component_of = vec![0; self.models.len()];
        for (c, members) in components.iter_mut().enumerate() {
            members.sort_by_key(|n| n.index());
            for member in members.iter() {
                component_of[member.index()] = c;
            }
        }

        let mut pending = vec![0usize; components.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); components.len()];
        for edge in graph.raw_edges() {
            let from = component_of[edge.source().index()];
            let to = component_of[edge.target().index()];
            if from != to {
                pending[to] += 1;
                dependents[from].push(to);
            }
        }

        // Ready components leave in order of their earliest registration.
        let first = |c: usize| components[c][0].index();
        let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..components.len())
            .filter(|&c| pending[c] == 0)
            .map(|c| Reverse((first(c), c)))
            .collect();

        let mut ordered = Vec::with_capacity(self.models.len());
        while let Some(Reverse((_, c))) = ready.pop() {
            ordered.extend(components[c].iter().map(|n| &self.models[graph[*n]]));
            for &next in &dependents[c] {
                pending[next] -= 1;
                if pending[next] == 0 {
                    ready.push(Reverse((first(next), next)));
                }
            }
        }
        ordered
    }

    /// Relation fields of other models that point at `table`.
    ///
    /// Returns `(referring model, field name)` pairs.
    pub fn inbound_references(&self, table: &str) -> Vec<(&ModelDefinition, &str)> {
        self.models
            .iter()
            .filter(|m| m.name != table)
            .flat_map(|m| {
                m.fields.iter().filter_map(move |f| match &f.definition.references {
                    Some(r) if r.model == table => Some((m, f.name.as_str())),
                    _ => None,
                })
            })
            .collect()
    }
}

/// The models every console ships with.
pub fn builtin_models() -> Vec<ModelDefinition> {
    vec![
        ModelDefinition::new("examples")
            .field("title", FieldDefinition::new(FieldType::Text).not_null())
            .field("description", FieldDefinition::new(FieldType::Text))
            .field(
                "isActive",
                FieldDefinition::new(FieldType::Boolean)
                    .not_null()
                    .default_value("true"),
            )
            .field(
                "count",
                FieldDefinition::new(FieldType::Integer)
                    .not_null()
                    .default_value("0"),
            )
            .field("metadata", FieldDefinition::new(FieldType::Jsonb))
            .with_timestamps(),
        ModelDefinition::new("categories")
            .field("name", FieldDefinition::new(FieldType::Text).not_null())
            .field("description", FieldDefinition::new(FieldType::Text))
            .with_timestamps(),
        ModelDefinition::new("products")
            .field("name", FieldDefinition::new(FieldType::Text).not_null())
            .field("description", FieldDefinition::new(FieldType::Text))
            .field("price", FieldDefinition::new(FieldType::Float).not_null())
            .field(
                "stock",
                FieldDefinition::new(FieldType::Integer).default_value("0"),
            )
            .field(
                "category_id",
                FieldDefinition::new(FieldType::Uuid).references("categories", "id"),
            )
            .with_timestamps(),
    ]
}
