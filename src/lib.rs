//! zlive - 记录字段实时编辑库
//!
//! 模块结构：
//! - kernel: 同步引擎（DebounceSite, RenderSignal, MarkerTracker, EditorSync）及服务端口/适配器
//! - models: 数据模型（TextBuffer）
//! - widgets: 内置编辑组件（RopeWidget）
//! - app: 应用层（FieldEditor）

pub mod app;
pub mod kernel;
pub mod models;
pub mod widgets;
