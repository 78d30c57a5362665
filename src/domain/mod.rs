// 領域層：實體結構、回應封裝與 ports。只依賴 serde/chrono 與本 crate 的錯誤型別

pub mod envelope;
pub mod model;
pub mod patch;
pub mod ports;
pub mod requests;
