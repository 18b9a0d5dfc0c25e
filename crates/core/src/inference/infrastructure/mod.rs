pub mod onnx_runner;
