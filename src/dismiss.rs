use crate::Result;
use crate::dom::{Dom, NodeId};

/// Closes an alert element the way the host UI library does.
pub trait Dismissible {
    fn close(&mut self, dom: &mut Dom, alert: NodeId) -> Result<()>;
}

impl<F> Dismissible for F
where
    F: FnMut(&mut Dom, NodeId) -> Result<()>,
{
    fn close(&mut self, dom: &mut Dom, alert: NodeId) -> Result<()> {
        self(dom, alert)
    }
}

/// Bootstrap's `alert("close")`: drop `show`, then detach the element.
/// Closing an already detached alert does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapAlert;

impl Dismissible for BootstrapAlert {
    fn close(&mut self, dom: &mut Dom, alert: NodeId) -> Result<()> {
        if !dom.is_connected(alert) {
            return Ok(());
        }
        dom.class_remove(alert, "show")?;
        dom.remove_node(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    #[test]
    fn bootstrap_alert_detaches_and_tolerates_repeat_close() -> Result<()> {
        let mut dom = parse_html(
            r#"<main><div class="alert fade show auto-dismiss-alert" id="flash">Saved</div></main>"#,
        )?;
        let alert = dom.by_id("flash").expect("alert");

        BootstrapAlert.close(&mut dom, alert)?;
        assert!(!dom.is_connected(alert));
        assert!(!dom.class_contains(alert, "show")?);
        assert!(dom.query_selector(".auto-dismiss-alert")?.is_none());

        BootstrapAlert.close(&mut dom, alert)?;
        Ok(())
    }

    #[test]
    fn closures_act_as_dismissers() -> Result<()> {
        let mut dom = parse_html(r#"<div class="alert" id="a"></div>"#)?;
        let alert = dom.by_id("a").expect("alert");
        let mut closed = Vec::new();
        let mut hide = |dom: &mut Dom, node: NodeId| {
            closed.push(node);
            dom.set_attr(node, "hidden", "")
        };
        hide.close(&mut dom, alert)?;
        assert_eq!(closed, vec![alert]);
        assert_eq!(dom.attr(alert, "hidden").as_deref(), Some(""));
        Ok(())
    }
}
