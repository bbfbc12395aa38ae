//! Mapping of backend log documents.

use shared::{EntityType, LogEntry, LogSubject, RemoteLog};

pub struct LogMapper;

impl LogMapper {
    pub fn to_domain(dto: RemoteLog) -> LogEntry {
        let subject = Self::subject_of(&dto);

        LogEntry {
            id: dto.id.unwrap_or_else(LogEntry::generate_id),
            level: dto.level,
            message: dto.message,
            time: dto.time.or(dto.timestamp).unwrap_or_default(),
            source: dto.source.unwrap_or_default(),
            operator: dto.operator.unwrap_or_default(),
            subject,
        }
    }

    pub fn to_domain_list(dtos: Vec<RemoteLog>) -> Vec<LogEntry> {
        dtos.into_iter().map(Self::to_domain).collect()
    }

    /// Explicit entity fields win; a bare `card_id` names a card; anything
    /// else is a system entry.
    fn subject_of(dto: &RemoteLog) -> LogSubject {
        match (&dto.entity_type, &dto.entity_ids, &dto.card_id) {
            (Some(entity_type), Some(ids), _) => LogSubject {
                entity_type: *entity_type,
                entity_ids: ids.clone(),
            },
            (None, _, Some(card_id)) | (Some(EntityType::Card), None, Some(card_id)) => {
                LogSubject::card(card_id.clone())
            }
            _ => LogSubject::system(),
        }
    }
}
