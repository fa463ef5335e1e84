//! 请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{
    AnswerVoteRequest, ChangePasswordRequest, CreateAnswerRequest, CreateQuestionRequest,
    like_pattern, GlobalSearchQuery, ListQuery, LoginRequest, QuestionActionRequest, SignupRequest,
    UpdateAnswerRequest, UpdateProfileRequest, UpdateQuestionRequest,
};

pub use response::{
    AnswerDto, ApiResponse, AuthResponse, AuthorDto, CreatedResponse, PageResponse,
    QuestionDetailDto, QuestionSummaryDto, SearchHit, TagDetailDto, TagDto, TagRef,
    TopQuestionDto, UserDto, UserProfileDto, UserStatsDto, UserTagDto, ViewCountDto,
};
