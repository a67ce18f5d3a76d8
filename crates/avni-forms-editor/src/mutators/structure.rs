//! Adding, deleting and reordering groups and elements

use avni_forms_model::{FormDefinition, FormElement, FormElementGroup};
use log::debug;

/// Position a new entry goes to: right after `after`, or first in an empty list
fn insertion_point(len: usize, after: usize) -> Option<usize> {
    if len == 0 {
        Some(0)
    } else if after < len {
        Some(after + 1)
    } else {
        None
    }
}

/// Insert a new group holding one blank element after group `after`
pub fn add_group(form: &mut FormDefinition, after: usize) {
    let groups = &mut form.form_element_groups;
    let Some(at) = insertion_point(groups.len(), after) else {
        debug!("add_group: no group at index {}", after);
        return;
    };
    groups.insert(at, FormElementGroup::new_default());
}

/// Insert a blank element after element `after` of the group
pub fn add_element(group: &mut FormElementGroup, after: usize) {
    let elements = &mut group.form_elements;
    let Some(at) = insertion_point(elements.len(), after) else {
        debug!("add_element: no element at index {} in group {}", after, group.uuid);
        return;
    };
    elements.insert(at, FormElement::new_default());
}

pub fn delete_group(form: &mut FormDefinition, index: usize) {
    match form.form_element_groups.get_mut(index) {
        Some(group) => group.voided = true,
        None => debug!("delete_group: no group at index {}", index),
    }
}

pub fn delete_element(group: &mut FormElementGroup, index: usize) {
    match group.form_elements.get_mut(index) {
        Some(element) => element.voided = true,
        None => debug!("delete_element: no element at index {} in group {}", index, group.uuid),
    }
}

/// Move group `source` to where the `destination`-th live group stands.
///
/// `source` indexes the stored sequence; `destination` counts only
/// non-voided groups, the way the designer lists them.
pub fn move_group(form: &mut FormDefinition, source: usize, destination: usize) {
    let groups = &mut form.form_element_groups;
    if source >= groups.len() {
        debug!("move_group: no group at index {}", source);
        return;
    }
    let Some(target) = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.voided)
        .nth(destination)
        .map(|(index, _)| index)
    else {
        debug!("move_group: no live group at position {}", destination);
        return;
    };

    let group = groups.remove(source);
    let target = target.min(groups.len());
    groups.insert(target, group);
}

/// Move an element, possibly into another group. The element takes the
/// question-group parent of the element it is dropped onto.
pub fn move_element(
    form: &mut FormDefinition,
    source_group: usize,
    source_index: usize,
    destination_group: usize,
    destination_index: usize,
) {
    if form.element(source_group, source_index).is_none() {
        debug!(
            "move_element: no element at {}/{}",
            source_group, source_index
        );
        return;
    }
    let Some(destination) = form.form_element_groups.get(destination_group) else {
        debug!("move_element: no group at index {}", destination_group);
        return;
    };
    let parent = destination
        .form_elements
        .get(destination_index)
        .and_then(|sibling| sibling.parent_form_element_uuid.clone());

    let mut element = form.form_element_groups[source_group]
        .form_elements
        .remove(source_index);
    element.parent_form_element_uuid = parent;

    let elements = &mut form.form_element_groups[destination_group].form_elements;
    let at = destination_index.min(elements.len());
    elements.insert(at, element);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named_group(name: &str) -> FormElementGroup {
        FormElementGroup {
            name: name.into(),
            ..FormElementGroup::new_default()
        }
    }

    fn names(form: &FormDefinition) -> Vec<&str> {
        form.form_element_groups
            .iter()
            .map(|g| g.name.as_str())
            .collect()
    }

    fn form_of(names: &[&str]) -> FormDefinition {
        FormDefinition {
            form_element_groups: names.iter().map(|n| named_group(n)).collect(),
            ..FormDefinition::default()
        }
    }

    #[test]
    fn test_add_group_after_index() {
        let mut form = form_of(&["A", "B"]);
        add_group(&mut form, 0);

        assert_eq!(form.form_element_groups.len(), 3);
        assert_eq!(form.form_element_groups[1].name, "");
        assert_eq!(form.form_element_groups[1].form_elements.len(), 1);
        assert_eq!(form.form_element_groups[2].name, "B");
    }

    #[test]
    fn test_add_group_to_empty_form() {
        let mut form = FormDefinition::default();
        add_group(&mut form, 5);
        assert_eq!(form.form_element_groups.len(), 1);
    }

    #[test]
    fn test_add_group_bad_index_is_noop() {
        let mut form = form_of(&["A"]);
        add_group(&mut form, 3);
        assert_eq!(names(&form), vec!["A"]);
    }

    #[test]
    fn test_new_entities_get_distinct_uuids() {
        let mut group = named_group("A");
        add_element(&mut group, 0);
        add_element(&mut group, 0);
        let uuids: std::collections::HashSet<_> =
            group.form_elements.iter().map(|e| e.uuid.clone()).collect();
        assert_eq!(uuids.len(), 3);
    }

    #[test]
    fn test_delete_is_soft() {
        let mut form = form_of(&["A", "B"]);
        delete_group(&mut form, 0);
        assert!(form.form_element_groups[0].voided);
        assert_eq!(form.form_element_groups.len(), 2);

        delete_element(&mut form.form_element_groups[1], 0);
        assert!(form.form_element_groups[1].form_elements[0].voided);
    }

    #[test]
    fn test_move_group_counts_live_groups() {
        let mut form = form_of(&["A", "gone", "B", "C"]);
        form.form_element_groups[1].voided = true;

        // Third visible group is "C", stored at index 3
        move_group(&mut form, 0, 2);
        assert_eq!(names(&form), vec!["gone", "B", "C", "A"]);

        move_group(&mut form, 3, 0);
        assert_eq!(names(&form), vec!["gone", "A", "B", "C"]);
    }

    #[test]
    fn test_move_group_out_of_range_is_noop() {
        let mut form = form_of(&["A", "B"]);
        move_group(&mut form, 0, 7);
        move_group(&mut form, 9, 0);
        assert_eq!(names(&form), vec!["A", "B"]);
    }

    #[test]
    fn test_move_element_reparents() {
        let mut form = form_of(&["A", "B"]);
        form.form_element_groups[0].form_elements[0].name = "moved".into();
        form.form_element_groups[1].form_elements[0].parent_form_element_uuid =
            Some("qg-1".into());

        move_element(&mut form, 0, 0, 1, 0);

        assert!(form.form_element_groups[0].form_elements.is_empty());
        let moved = &form.form_element_groups[1].form_elements[0];
        assert_eq!(moved.name, "moved");
        assert_eq!(moved.parent_form_element_uuid.as_deref(), Some("qg-1"));
        assert_eq!(form.form_element_groups[1].form_elements.len(), 2);
    }

    #[test]
    fn test_move_element_within_group() {
        let mut form = form_of(&["A"]);
        add_element(&mut form.form_element_groups[0], 0);
        add_element(&mut form.form_element_groups[0], 1);
        for (i, element) in form.form_element_groups[0].form_elements.iter_mut().enumerate() {
            element.name = format!("e{}", i);
        }

        move_element(&mut form, 0, 0, 0, 2);
        let order: Vec<_> = form.form_element_groups[0]
            .form_elements
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(order, vec!["e1", "e2", "e0"]);
    }
}
