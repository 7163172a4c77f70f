use crate::config::AlertConfig;
use crate::dismiss::Dismissible;
use crate::dom::{Dom, NodeId};
use crate::scheduler::{Scheduler, TimerId};
use crate::{Result, Task};

/// Closes every alert present at mount time once, after a fixed delay.
#[derive(Debug, Clone, Default)]
pub struct AlertAutoDismiss {
    pending: Vec<(NodeId, TimerId)>,
    closed: Vec<NodeId>,
}

impl AlertAutoDismiss {
    pub fn mount<S>(alerts: &[NodeId], config: &AlertConfig, scheduler: &mut S) -> Option<Self>
    where
        S: Scheduler<Task> + ?Sized,
    {
        if alerts.is_empty() {
            return None;
        }
        let pending = alerts
            .iter()
            .map(|alert| {
                let timer = scheduler.set_timeout(config.delay_ms, Task::DismissAlert { alert: *alert });
                (*alert, timer)
            })
            .collect();
        Some(Self {
            pending,
            closed: Vec::new(),
        })
    }

    pub fn pending(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pending.iter().map(|(alert, _)| *alert)
    }

    pub fn closed(&self) -> &[NodeId] {
        &self.closed
    }

    /// Runs when an alert's timeout fires. Returns `false` for alerts this
    /// instance is not (or no longer) tracking.
    pub fn dismiss(
        &mut self,
        dom: &mut Dom,
        dismisser: &mut dyn Dismissible,
        alert: NodeId,
    ) -> Result<bool> {
        let Some(pos) = self.pending.iter().position(|(node, _)| *node == alert) else {
            return Ok(false);
        };
        self.pending.remove(pos);
        dismisser.close(dom, alert)?;
        self.closed.push(alert);
        Ok(true)
    }

    pub fn dispose<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<Task> + ?Sized,
    {
        for (_, timer) in self.pending.drain(..) {
            scheduler.clear(timer);
        }
    }
}
