//! Pass counting across iterations.

/// Lifecycle of the grading loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Passed-count per subproject plus the number of completed iterations.
///
/// Results are staged per iteration and only counted once the iteration
/// completes, so `passed(p) <= iterations()` holds at every stop point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    projects: Vec<String>,
    passed: Vec<u32>,
    pending: Vec<u32>,
    iterations: u32,
}

impl Tally {
    pub fn new<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let projects: Vec<String> = projects.into_iter().map(Into::into).collect();
        let count = projects.len();
        Self {
            projects,
            passed: vec![0; count],
            pending: vec![0; count],
            iterations: 0,
        }
    }

    /// Stage one result for `project` in the current iteration.
    ///
    /// Unknown projects are ignored.
    pub fn record(&mut self, project: &str, passed: bool) {
        if let Some(idx) = self.position(project) {
            self.pending[idx] += u32::from(passed);
        }
    }

    /// Fold the staged results into the counts and advance the iteration counter.
    pub fn complete_iteration(&mut self) {
        for (total, staged) in self.passed.iter_mut().zip(self.pending.iter_mut()) {
            *total += *staged;
            *staged = 0;
        }
        self.iterations += 1;
    }

    /// Number of staged passes that will be dropped if the loop stops now.
    pub fn pending_passes(&self) -> u32 {
        self.pending.iter().sum()
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn passed(&self, project: &str) -> Option<u32> {
        self.position(project).map(|idx| self.passed[idx])
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// One `"<name>:      <passed>/<iterations>"` line per project, in configured order.
    pub fn summary_lines(&self) -> Vec<String> {
        self.projects
            .iter()
            .zip(&self.passed)
            .map(|(name, passed)| format!("{name}:      {passed}/{}", self.iterations))
            .collect()
    }

    fn position(&self, project: &str) -> Option<usize> {
        self.projects.iter().position(|p| p == project)
    }
}

/// Full results block printed when the loop stops.
pub fn render_summary(tally: &Tally) -> String {
    let mut out = String::from("\n*** RESULTS: ***\n\n");
    for line in tally.summary_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
