mod decode_file;
mod encode_file;

pub use decode_file::DecodeFileUseCase;
pub use encode_file::EncodeFileUseCase;
