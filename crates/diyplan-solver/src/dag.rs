//! Dependency graph construction and validation
//!
//! Tasks arrive as a flat list with predecessor ids. This module resolves
//! those ids, rejects unknown references and cycles, and produces the
//! topological order every later pass walks.
//!
//! Ordering is deterministic: among tasks that become ready at the same
//! time, the one listed first in the input goes first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use diyplan_core::{ScheduleError, Task, TaskId};

/// Errors during graph construction
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Cycle detected in dependencies
    CycleDetected { tasks: Vec<TaskId> },
    /// Referenced task doesn't exist
    MissingDependency { task: TaskId, missing: TaskId },
    /// The same id appears twice
    DuplicateTask(TaskId),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::CycleDetected { tasks } => {
                write!(f, "Cycle detected involving tasks: {:?}", tasks)
            }
            GraphError::MissingDependency { task, missing } => {
                write!(f, "Task '{}' depends on '{}' which doesn't exist", task, missing)
            }
            GraphError::DuplicateTask(id) => write!(f, "Task '{}' is defined twice", id),
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for ScheduleError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::CycleDetected { tasks } => ScheduleError::CyclicDependency(tasks),
            GraphError::MissingDependency { task, missing } => {
                ScheduleError::UnknownDependency { task, missing }
            }
            GraphError::DuplicateTask(id) => ScheduleError::DuplicateTaskId(id),
        }
    }
}

/// Validated dependency graph over node indices (input order)
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Node ids in input order
    pub ids: Vec<TaskId>,
    /// Node lookup by id
    pub index: HashMap<TaskId, usize>,
    /// Direct predecessors of each node, deduplicated, in declaration order
    pub predecessors: Vec<Vec<usize>>,
    /// Direct successors of each node, in input order
    pub successors: Vec<Vec<usize>>,
    /// Topological order (computed once, reused)
    pub topo_order: Vec<usize>,
}

impl DependencyGraph {
    /// Build from `(id, dependencies)` pairs in input order
    pub fn build<'a, I>(nodes: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (&'a str, &'a [TaskId])>,
    {
        let nodes: Vec<(&str, &[TaskId])> = nodes.into_iter().collect();

        let mut ids = Vec::with_capacity(nodes.len());
        let mut index: HashMap<TaskId, usize> = HashMap::with_capacity(nodes.len());
        for (i, (id, _)) in nodes.iter().enumerate() {
            if index.insert((*id).to_string(), i).is_some() {
                return Err(GraphError::DuplicateTask((*id).to_string()));
            }
            ids.push((*id).to_string());
        }

        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

        for (i, (id, deps)) in nodes.iter().enumerate() {
            for dep in deps.iter() {
                let Some(&pred) = index.get(dep) else {
                    return Err(GraphError::MissingDependency {
                        task: (*id).to_string(),
                        missing: dep.clone(),
                    });
                };
                if !predecessors[i].contains(&pred) {
                    predecessors[i].push(pred);
                    successors[pred].push(i);
                }
            }
        }
        for succ in &mut successors {
            succ.sort_unstable();
        }

        let topo_order = topological_sort(&ids, &predecessors, &successors)?;

        Ok(Self {
            ids,
            index,
            predecessors,
            successors,
            topo_order,
        })
    }

    /// Build from the tasks of a scheduling request
    pub fn from_tasks(tasks: &[Task]) -> Result<Self, GraphError> {
        Self::build(tasks.iter().map(|t| (t.id.as_str(), t.dependencies.as_slice())))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in topological order
    pub fn ordered_ids(&self) -> impl Iterator<Item = &TaskId> + '_ {
        self.topo_order.iter().map(|&i| &self.ids[i])
    }

    /// Position of each node within the topological order
    pub fn topo_rank(&self) -> Vec<usize> {
        let mut rank = vec![0; self.ids.len()];
        for (pos, &node) in self.topo_order.iter().enumerate() {
            rank[node] = pos;
        }
        rank
    }

    pub fn has_dependents(&self, node: usize) -> bool {
        !self.successors[node].is_empty()
    }
}

/// Order tasks so that every task follows all of its dependencies
pub fn order(tasks: &[Task]) -> Result<Vec<&Task>, GraphError> {
    let graph = DependencyGraph::from_tasks(tasks)?;
    Ok(graph.topo_order.iter().map(|&i| &tasks[i]).collect())
}

/// Kahn's algorithm for topological sort, ready ties broken by input order
fn topological_sort(
    ids: &[TaskId],
    predecessors: &[Vec<usize>],
    successors: &[Vec<usize>],
) -> Result<Vec<usize>, GraphError> {
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();

    // Min-heap on the input index keeps the order stable
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut result = Vec::with_capacity(ids.len());

    while let Some(Reverse(node)) = ready.pop() {
        result.push(node);
        for &succ in &successors[node] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.push(Reverse(succ));
            }
        }
    }

    // Check for cycle
    if result.len() != ids.len() {
        let remaining: Vec<TaskId> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg > 0)
            .map(|(i, _)| ids[i].clone())
            .collect();
        return Err(GraphError::CycleDetected { tasks: remaining });
    }

    Ok(result)
}
