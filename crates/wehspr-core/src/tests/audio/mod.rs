mod capture;
mod engine;
mod pipeline;
mod resampler;
mod wav;
