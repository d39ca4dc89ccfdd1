use crate::ObjectId;

/// 单次状态查询结果（瞬态，不落库）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub object_id: ObjectId,
    pub online: bool,
}

impl StatusReport {
    pub fn online(object_id: ObjectId) -> Self {
        Self {
            object_id,
            online: true,
        }
    }

    /// 离线或查询失败都按离线处理。
    pub fn offline(object_id: ObjectId) -> Self {
        Self {
            object_id,
            online: false,
        }
    }
}

/// 在线记录：每个对象最多一条。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceRecord {
    pub object_id: ObjectId,
    pub last_seen_at_ms: i64,
}

/// 一次回调收到的对象批次，共享同一个接收时间。
#[derive(Debug, Clone)]
pub struct Batch {
    pub object_ids: Vec<ObjectId>,
    pub received_at_ms: i64,
}

impl Batch {
    pub fn new(object_ids: Vec<ObjectId>, received_at_ms: i64) -> Self {
        Self {
            object_ids,
            received_at_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.object_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_ids.is_empty()
    }
}
