use serde::{Deserialize, Serialize};

use crate::database::File;

/// 文件列表，`count` 为所有者名下的总数
#[derive(Debug, Serialize, Deserialize)]
pub struct FilesPublic {
    pub data: Vec<File>,
    pub count: i64,
}
