//! Deviation application.
//!
//! Deviations run after augmentation and implicit-case insertion, so
//! their targets are final. Each `deviate` aspect edits the resolved
//! target entry: `not-supported` removes it, `add`/`replace` set the
//! named attributes, `delete` clears them back to unset.

use super::entry::{EntryId, TriState};
use super::expand::Expander;
use crate::ast::NodeId;

impl Expander<'_> {
    pub(crate) fn apply_deviations(&mut self) {
        let roots: Vec<EntryId> = self.tree.roots.values().copied().collect();
        for root in roots {
            for deviation in std::mem::take(&mut self.tree[root].deviations) {
                self.apply_deviation(root, deviation);
            }
        }
    }

    fn apply_deviation(&mut self, root: EntryId, deviation: EntryId) {
        let path = self.tree[deviation].name.clone();
        let Some(node) = self.tree[deviation].node else {
            return;
        };
        let Ok(target) = self.tree.resolve_path(root, &path) else {
            self.error(node, format!("deviation target not found: \"{path}\""));
            return;
        };
        let deviates = self.arena[node]
            .kind
            .as_deviation()
            .map(|d| d.deviate.clone())
            .unwrap_or_default();
        for deviate in deviates {
            self.apply_deviate(target, deviate);
        }
    }

    fn apply_deviate(&mut self, target: EntryId, deviate: NodeId) {
        let aspect = self.arena[deviate].name.clone();
        match aspect.as_str() {
            "not-supported" => {
                if self.options.ignore_deviate_not_supported {
                    return;
                }
                tracing::debug!(target = %self.tree[target].name, "removing not-supported node");
                if let Some(parent) = self.tree[target].parent {
                    let name = self.tree[target].name.clone();
                    self.tree[parent].dir.shift_remove(&name);
                }
            }
            "add" | "replace" => self.deviate_set(target, deviate),
            "delete" => self.deviate_delete(target, deviate),
            other => {
                self.error(deviate, format!("unknown deviate \"{other}\""));
            }
        }
    }

    /// `add` and `replace` share set semantics on resolved entries: the
    /// named attribute is (over)written.
    fn deviate_set(&mut self, target: EntryId, deviate: NodeId) {
        let Some(shape) = self.arena[deviate].kind.as_deviate().cloned() else {
            return;
        };
        if shape.config.is_some() {
            let config = self.tri(shape.config);
            self.tree[target].config = config;
        }
        if shape.mandatory.is_some() {
            let mandatory = self.tri(shape.mandatory);
            self.tree[target].mandatory = mandatory;
        }
        if let Some(default) = shape.default {
            self.tree[target].default = Some(self.arena[default].name.to_string());
        }
        if let Some(units) = shape.units {
            self.tree[target].units = Some(self.arena[units].name.to_string());
        }
        if shape.min_elements.is_some() || shape.max_elements.is_some() {
            if self.tree[target].list_attr.is_none() {
                self.error(
                    deviate,
                    format!(
                        "cannot deviate min/max-elements of \"{}\": not a list or leaf-list",
                        self.tree[target].name
                    ),
                );
            } else {
                let refined = self.deviate_list_attr(&shape);
                let attr = self.tree[target].list_attr.as_mut().expect("checked above");
                if refined.0.is_some() {
                    attr.min_elements = refined.0;
                }
                if shape.max_elements.is_some() {
                    attr.max_elements = refined.1;
                }
            }
        }
        if let Some(type_stmt) = shape.type_stmt {
            // the replacement type was resolved in the deviation's own
            // typedef scope during type resolution
            let resolved = self.arena[type_stmt]
                .kind
                .as_type()
                .and_then(|t| t.yang_type.as_deref())
                .cloned();
            if let Some(resolved) = resolved {
                self.tree[target].yang_type = Some(resolved);
            }
        }
        for must in shape.must {
            let text = self.arena[must].name.to_string();
            self.tree[target].musts.push(text);
        }
        for unique in shape.unique {
            let text = self.arena[unique].name.to_string();
            self.tree[target].unique.push(text);
        }
    }

    /// `delete` returns the named attributes to their unset state.
    fn deviate_delete(&mut self, target: EntryId, deviate: NodeId) {
        let Some(shape) = self.arena[deviate].kind.as_deviate().cloned() else {
            return;
        };
        if shape.config.is_some() {
            self.tree[target].config = TriState::Unset;
        }
        if shape.mandatory.is_some() {
            self.tree[target].mandatory = TriState::Unset;
        }
        if shape.default.is_some() {
            self.tree[target].default = None;
        }
        if shape.units.is_some() {
            self.tree[target].units = None;
        }
        if let Some(attr) = self.tree[target].list_attr.as_mut() {
            if shape.min_elements.is_some() {
                attr.min_elements = None;
            }
            if shape.max_elements.is_some() {
                attr.max_elements = None;
            }
        }
        for must in shape.must {
            let text = self.arena[must].name.to_string();
            self.tree[target].musts.retain(|m| *m != text);
        }
        for unique in shape.unique {
            let text = self.arena[unique].name.to_string();
            self.tree[target].unique.retain(|u| *u != text);
        }
        if shape.type_stmt.is_some() {
            self.error(deviate, "cannot delete a type");
        }
    }

    fn deviate_list_attr(
        &mut self,
        shape: &crate::ast::DeviateNode,
    ) -> (Option<u64>, Option<u64>) {
        let mut min = None;
        let mut max = None;
        if let Some(id) = shape.min_elements {
            match self.arena[id].name.parse::<u64>() {
                Ok(n) => min = Some(n),
                Err(_) => {
                    let value = self.arena[id].name.clone();
                    self.error(id, format!("invalid min-elements {value:?}"));
                }
            }
        }
        if let Some(id) = shape.max_elements {
            let value = self.arena[id].name.clone();
            if value != "unbounded" {
                match value.parse::<u64>() {
                    Ok(n) => max = Some(n),
                    Err(_) => self.error(id, format!("invalid max-elements {value:?}")),
                }
            }
        }
        (min, max)
    }
}
