use petgraph::graph::{DiGraph, NodeIndex};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{HashMap, HashSet};

/// Adjacency map from display name to friend display names.
///
/// Keys keep insertion order and each edge list keeps discovery order,
/// duplicates included, so the same crawl always yields the same graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoafGraph {
    vertices: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl FoafGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains_vertex(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Adds `name` with `friends` as its edge list. If `name` is already a key
    /// the friends are appended to its existing list.
    pub fn insert_vertex(&mut self, name: impl Into<String>, friends: Vec<String>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&idx) => self.vertices[idx].1.extend(friends),
            None => {
                self.index.insert(name.clone(), self.vertices.len());
                self.vertices.push((name, friends));
            }
        }
    }

    /// Adds `name` with an empty edge list unless it is already a key.
    /// Returns true if the vertex was created.
    pub fn ensure_vertex(&mut self, name: &str) -> bool {
        if self.contains_vertex(name) {
            return false;
        }
        self.insert_vertex(name, Vec::new());
        true
    }

    /// Appends `target` to the edge list of `source`, creating `source` if
    /// needed. The target is not made a key.
    pub fn push_edge(&mut self, source: &str, target: impl Into<String>) {
        self.ensure_vertex(source);
        let idx = self.index[source];
        self.vertices[idx].1.push(target.into());
    }

    pub fn friends_of(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&idx| self.vertices[idx].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|(name, _)| name.as_str())
    }

    /// `(key, edge list)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.vertices
            .iter()
            .map(|(name, friends)| (name.as_str(), friends.as_slice()))
    }

    /// `(source, target)` pairs in key order then edge-list order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .flat_map(|(source, friends)| friends.iter().map(move |t| (source, t.as_str())))
    }

    pub fn edge_count(&self) -> usize {
        self.vertices.iter().map(|(_, friends)| friends.len()).sum()
    }

    /// Names that appear only as edge targets, in first-discovery order.
    pub fn value_only_vertices(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.edges()
            .map(|(_, target)| target)
            .filter(|target| !self.contains_vertex(target) && seen.insert(*target))
            .collect()
    }

    /// Every distinct name, keys first, then value-only names.
    pub fn all_vertices(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys().collect();
        names.extend(self.value_only_vertices());
        names
    }

    /// Keys with an empty edge list.
    pub fn leaves(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, friends)| friends.is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Builds a petgraph view for analysis. Duplicate edges are kept.
    pub fn to_petgraph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for name in self.all_vertices() {
            nodes.insert(name, graph.add_node(name.to_string()));
        }
        for (source, target) in self.edges() {
            graph.add_edge(nodes[source], nodes[target], ());
        }

        graph
    }
}

impl<K, V> FromIterator<(K, Vec<V>)> for FoafGraph
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        let mut graph = FoafGraph::new();
        for (name, friends) in iter {
            graph.insert_vertex(name, friends.into_iter().map(Into::into).collect());
        }
        graph
    }
}

impl Serialize for FoafGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.vertices.len()))?;
        for (name, friends) in &self.vertices {
            map.serialize_entry(name, friends)?;
        }
        map.end()
    }
}
