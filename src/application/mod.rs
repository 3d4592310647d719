//! 应用层
//!
//! 业务编排：置信度路由与降级

pub mod router;
