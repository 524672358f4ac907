// 数据库服务模块
// 提供 SQLite 数据库操作，支持分类与题目管理

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// 默认分类，仅在分类表为空时写入
const DEFAULT_CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

/// 数据库错误
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Database task failed: {0}")]
    Task(String),
}

pub type DbResult<T> = Result<T, DatabaseError>;

/// 分类数据结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// 题目数据结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i32,
}

/// 新题目（id 由数据库分配）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i32,
}

/// 数据库服务
#[derive(Clone)]
pub struct DatabaseService {
    pool: Arc<Mutex<Connection>>,
}

impl DatabaseService {
    /// 打开指定路径的数据库，必要时创建目录
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db_path = path.as_ref().to_path_buf();

        // 确保数据目录存在
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| DatabaseError::Directory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        log::info!("Opening database at {:?}", db_path);
        let conn = Connection::open(&db_path)?;
        Self::from_connection(conn)
    }

    /// 内存数据库（测试用）
    pub fn open_in_memory() -> DbResult<Self> {
        log::debug!("Opening in-memory database");
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        register_functions(&conn)?;
        let service = Self {
            pool: Arc::new(Mutex::new(conn)),
        };
        service.initialize()?;
        Ok(service)
    }

    /// 在阻塞线程池中执行数据库操作
    pub async fn call<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&DatabaseService) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.clone();
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| DatabaseError::Task(e.to_string()))?
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.pool.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// 初始化数据库表结构
    pub fn initialize(&self) -> DbResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                category INTEGER NOT NULL,
                difficulty INTEGER NOT NULL CHECK(difficulty BETWEEN 1 AND 5),
                FOREIGN KEY (category) REFERENCES categories(id)
            );

            CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
        ",
        )?;

        Ok(())
    }

    /// 分类表为空时写入默认分类，返回写入数量
    pub fn seed_default_categories(&self) -> DbResult<usize> {
        if self.count_categories()? > 0 {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO categories (type) VALUES (?)")?;
            for kind in DEFAULT_CATEGORIES {
                stmt.execute(rusqlite::params![kind])?;
            }
        }
        tx.commit()?;

        log::info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());
        Ok(DEFAULT_CATEGORIES.len())
    }

    // ==================== 分类 ====================

    #[cfg(test)]
    pub fn insert_category(&self, kind: &str) -> DbResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (type) VALUES (?)",
            rusqlite::params![kind],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn count_categories(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 按 id 排序列出分类
    pub fn list_categories_by_id(&self) -> DbResult<Vec<Category>> {
        self.query_categories("SELECT id, type FROM categories ORDER BY id")
    }

    /// 按名称排序列出分类
    pub fn list_categories_by_type(&self) -> DbResult<Vec<Category>> {
        self.query_categories("SELECT id, type FROM categories ORDER BY type, id")
    }

    pub fn get_category(&self, id: i64) -> DbResult<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, type FROM categories WHERE id = ?",
                rusqlite::params![id],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    fn query_categories(&self, sql: &str) -> DbResult<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], Self::row_to_category)?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    // ==================== 题目 CRUD ====================

    /// 按 id 排序列出全部题目
    pub fn list_questions(&self) -> DbResult<Vec<Question>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, category, difficulty
             FROM questions ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::row_to_question)?;

        let mut questions = Vec::new();
        for row in rows {
            questions.push(row?);
        }
        Ok(questions)
    }

    pub fn count_questions(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_question(&self, id: i64) -> DbResult<Option<Question>> {
        let conn = self.conn()?;
        let question = conn
            .query_row(
                "SELECT id, question, answer, category, difficulty
                 FROM questions WHERE id = ?",
                rusqlite::params![id],
                Self::row_to_question,
            )
            .optional()?;
        Ok(question)
    }

    /// 搜索题目（题干子串匹配，忽略大小写）
    ///
    /// 用 `fold_case` 做 Unicode 小写折叠，SQLite 自带的 LIKE/lower() 只处理 ASCII。
    pub fn search_questions(&self, term: &str) -> DbResult<Vec<Question>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, category, difficulty
             FROM questions WHERE instr(fold_case(question), fold_case(?)) > 0
             ORDER BY id",
        )?;

        let rows = stmt.query_map(rusqlite::params![term], Self::row_to_question)?;

        let mut questions = Vec::new();
        for row in rows {
            questions.push(row?);
        }
        Ok(questions)
    }

    /// 按分类获取题目
    pub fn questions_by_category(&self, category: i64) -> DbResult<Vec<Question>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, category, difficulty
             FROM questions WHERE category = ? ORDER BY id",
        )?;
        let rows = stmt.query_map(rusqlite::params![category], Self::row_to_question)?;

        let mut questions = Vec::new();
        for row in rows {
            questions.push(row?);
        }
        Ok(questions)
    }

    /// 添加题目，返回新 id
    pub fn insert_question(&self, new: &NewQuestion) -> DbResult<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO questions (question, answer, category, difficulty)
             VALUES (?, ?, ?, ?)",
            rusqlite::params![new.question, new.answer, new.category, new.difficulty],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(id)
    }

    /// 删除题目，返回是否确实删除了一行
    pub fn delete_question(&self, id: i64) -> DbResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let affected = tx.execute("DELETE FROM questions WHERE id = ?", rusqlite::params![id])?;

        tx.commit()?;
        Ok(affected > 0)
    }

    // ==================== 辅助方法 ====================

    fn row_to_category(row: &Row) -> Result<Category, rusqlite::Error> {
        Ok(Category {
            id: row.get(0)?,
            kind: row.get(1)?,
        })
    }

    fn row_to_question(row: &Row) -> Result<Question, rusqlite::Error> {
        Ok(Question {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
            category: row.get(3)?,
            difficulty: row.get(4)?,
        })
    }
}

/// 注册自定义 SQL 函数
fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: String = ctx.get(0)?;
            Ok(text.to_lowercase())
        },
    )?;
    Ok(())
}
