// Client-facing response messages.

pub const SUCCESS: &str = "Success";
pub const DATA_FETCHED: &str = "Data fetched successfully";

pub const QUEST_NOT_FOUND: &str = "Quest not found";
pub const QUIZ_NOT_FOUND: &str = "Quiz not found for this quest";
pub const QUIZ_HAS_NO_QUESTIONS: &str = "Quiz has no questions";
pub const QUEST_STARTED: &str = "Quest started successfully";
pub const QUEST_RESUMED: &str = "Quest already in progress, resuming";
pub const ATTEMPTS_EXHAUSTED: &str = "Maximum attempts reached for this quest";
pub const QUEST_ALREADY_COMPLETED: &str = "Quest already completed, no attempts left";
pub const ATTEMPT_NOT_FOUND: &str = "No quest in progress";
pub const NO_MORE_QUESTIONS: &str = "No more questions in this quest";
pub const QUESTION_NOT_FOUND: &str = "Question not found";
pub const QUESTION_FETCHED: &str = "Question fetched successfully";
pub const ANSWER_CORRECT: &str = "Correct answer";
pub const ANSWER_INCORRECT: &str = "Wrong answer";
pub const QUEST_COMPLETED: &str = "Quest completed";
pub const STALE_SUBMISSION: &str = "Answer does not match the current question, refresh and retry";
pub const ATTEMPT_MODIFIED: &str = "Quest progress was modified concurrently, please retry";
pub const SETTLEMENT_ALREADY_DONE: &str = "Rewards for this attempt were already granted";
pub const SETTLEMENT_NOT_PENDING: &str = "No completed quest awaiting rewards";

pub const LEADERBOARD_FETCHED: &str = "Leaderboard fetched successfully";
pub const REWARDS_FETCHED: &str = "Rewards fetched successfully";
pub const STUDENT_NOT_FOUND: &str = "Student not found";

pub const SUBSCRIPTION_REQUIRED: &str = "An active subscription is required";
pub const SUBSCRIPTION_EXPIRED: &str = "Subscription has expired";
