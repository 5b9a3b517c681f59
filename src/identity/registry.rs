use std::collections::HashSet;

/// Identifiers handed out during one pass.
///
/// Created fresh for every pass; nothing carries over between passes.
#[derive(Debug, Default)]
pub struct IdRegistry {
    used: HashSet<String>,
    collisions: usize,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `candidate`, or the first free `candidate_1`, `candidate_2`, ...
    ///
    /// Linear probing keeps the outcome a pure function of claim order: whoever claims
    /// first keeps the bare identifier.
    pub fn claim(&mut self, candidate: &str) -> String {
        let id = self.resolve(candidate);
        if id != candidate {
            self.collisions += 1;
        }
        self.used.insert(id.clone());
        id
    }

    /// The identifier `claim` would hand out for `candidate`, without taking it.
    pub fn resolve(&self, candidate: &str) -> String {
        if !self.used.contains(candidate) {
            return candidate.to_string();
        }
        let mut counter = 1usize;
        loop {
            let suffixed = format!("{candidate}_{counter}");
            if !self.used.contains(&suffixed) {
                return suffixed;
            }
            counter += 1;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Number of claims that needed a suffix.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}
