// reserved key defaults
pub const DOC_ID: &str = "_id";
pub const DOC_CREATED_AT: &str = "_createdAt";
pub const DOC_UPDATED_AT: &str = "_updatedAt";

// logical combinators
pub const OP_AND: &str = "$and";
pub const OP_OR: &str = "$or";

// comparison operators
pub const OP_EQ: &str = "$eq";
pub const OP_NE: &str = "$ne";
pub const OP_GT: &str = "$gt";
pub const OP_GTE: &str = "$gte";
pub const OP_LT: &str = "$lt";
pub const OP_LTE: &str = "$lte";
pub const OP_IN: &str = "$in";
pub const OP_NIN: &str = "$nin";
pub const OP_REGEX: &str = "$regex";

// modifiers
pub const MOD_INC: &str = "$inc";
pub const MOD_SET: &str = "$set";
pub const MOD_UNSET: &str = "$unset";
pub const MOD_PUSH: &str = "$push";
pub const MOD_MERGE: &str = "$merge";

// query option keys
pub const OPT_SORT: &str = "sort";
pub const OPT_PROJECT: &str = "project";
pub const OPT_SKIP: &str = "skip";
pub const OPT_TAKE: &str = "take";
pub const OPT_JOIN: &str = "join";

// join descriptor keys
pub const JOIN_COLLECTION: &str = "collection";
pub const JOIN_FROM: &str = "from";
pub const JOIN_TO: &str = "to";
pub const JOIN_AS: &str = "as";
pub const JOIN_OPTIONS: &str = "options";

// store constants
pub const FILE_EXTENSION: &str = "json";
pub const TEMP_FILE_SUFFIX: &str = "tmp";
