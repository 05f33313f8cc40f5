use crate::domain::{ConnectorKind, ConnectorMeta};

/// Collapses runs of same-kind connectors on consecutive rows into one.
///
/// `Added`/`Removed` connectors only merge when they share the same anchor line,
/// since the anchored side of the curve must stay a single point.
pub fn group_connectors(raw: Vec<ConnectorMeta>) -> Vec<ConnectorMeta> {
    let mut grouped: Vec<ConnectorMeta> = Vec::with_capacity(raw.len());

    for connector in raw {
        if let Some(last) = grouped.last_mut()
            && continues(last, &connector)
        {
            last.last_index = connector.last_index;
            last.last_row = connector.last_row;
            continue;
        }
        grouped.push(connector);
    }

    grouped
}

fn continues(prev: &ConnectorMeta, next: &ConnectorMeta) -> bool {
    if prev.kind != next.kind || next.first_index != prev.last_index + 1 {
        return false;
    }
    match prev.kind {
        ConnectorKind::Change => true,
        ConnectorKind::Added | ConnectorKind::Removed => prev.anchor == next.anchor,
    }
}
